//! Price source — the only component that performs network I/O.
//!
//! [`PriceSource`] is the seam the engine refreshes through; [`CoinGecko`]
//! is the production implementation. Retry policy lives in [`retry`] and is
//! applied by the caller around individual operations, never baked into the
//! client itself.

pub mod coingecko;
pub mod retry;
pub mod wire;

pub use coingecko::CoinGecko;
pub use retry::{with_retry, BackoffPolicy};
pub use wire::{AssetCatalog, AssetEntry};

use crate::error::SourceError;
use crate::shared::CoinId;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read-only access to an external spot-price provider.
#[async_trait]
pub trait PriceSource {
    /// The full catalog of known asset identifiers and symbols. Fetched
    /// once per process lifetime to resolve coin symbols lazily.
    async fn list_assets(&self) -> Result<Vec<AssetEntry>, SourceError>;

    /// Spot price for one asset in the given quote currency. `Ok(None)`
    /// when the pair does not exist in the response — a valid terminal
    /// state for a mistyped identifier, not an error.
    async fn spot_price(
        &self,
        id: &CoinId,
        quote_currency: &str,
    ) -> Result<Option<Decimal>, SourceError>;
}
