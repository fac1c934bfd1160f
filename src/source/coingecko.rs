//! CoinGecko REST client — the production [`PriceSource`].

use crate::error::SourceError;
use crate::shared::CoinId;
use crate::source::wire::{AssetEntry, SpotPrices};
use crate::source::PriceSource;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;

/// HTTP client for the CoinGecko v3 API.
pub struct CoinGecko {
    base_url: String,
    client: Client,
}

impl CoinGecko {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let resp = self.client.get(url).send().await.map_err(transient)?;
        let status = resp.status();

        // 4xx and 5xx are one undifferentiated transient class: the caller
        // retries or gives up, it never branches on the status.
        if !status.is_success() {
            return Err(SourceError::Transient {
                reason: format!("HTTP {} for {}", status.as_u16(), url),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    async fn list_assets(&self) -> Result<Vec<AssetEntry>, SourceError> {
        let url = format!("{}/coins/list", self.base_url);
        let entries: Vec<AssetEntry> = self.get_json(&url).await?;
        tracing::debug!(assets = entries.len(), "fetched asset catalog");
        Ok(entries)
    }

    async fn spot_price(
        &self,
        id: &CoinId,
        quote_currency: &str,
    ) -> Result<Option<Decimal>, SourceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            urlencoding::encode(id.as_str()),
            urlencoding::encode(quote_currency)
        );
        let prices: SpotPrices = self.get_json(&url).await?;
        Ok(prices.price_for(id, quote_currency))
    }
}

fn transient(e: reqwest::Error) -> SourceError {
    SourceError::Transient {
        reason: e.to_string(),
    }
}
