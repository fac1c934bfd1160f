//! Price-source wire types, mirroring the provider's response schema.

use crate::shared::CoinId;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// One entry of the `/coins/list` catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetEntry {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// `/simple/price` response: asset id → currency code → price.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotPrices(pub HashMap<String, HashMap<String, Decimal>>);

impl SpotPrices {
    /// The price for one pair; `None` when either key is absent.
    pub fn price_for(&self, id: &CoinId, quote_currency: &str) -> Option<Decimal> {
        self.0.get(id.as_str())?.get(quote_currency).copied()
    }
}

/// Symbol index built from the asset catalog, held for the process
/// lifetime.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    symbols: HashMap<String, String>,
}

impl AssetCatalog {
    pub fn from_entries(entries: Vec<AssetEntry>) -> Self {
        Self {
            symbols: entries
                .into_iter()
                .map(|entry| (entry.id, entry.symbol))
                .collect(),
        }
    }

    /// The symbol for an id; `None` when the catalog has never heard of it.
    pub fn symbol_for(&self, id: &CoinId) -> Option<&str> {
        self.symbols.get(id.as_str()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
