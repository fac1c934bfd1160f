//! Persistence gateway — the four operations the engine requires from the
//! storage layer.
//!
//! The dashboard's SQL schema and access layer live outside this crate; the
//! engine only ever sees the `CoinStore` trait. Two reference backends are
//! provided: `JsonStore` (flat files, used by the `tickerd` binary) and
//! `MemoryStore` (shared-state handle for tests).

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::shared::CoinId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One row of the watch set as storage holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: CoinId,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_previous: Option<Decimal>,
    #[serde(default)]
    pub in_message: bool,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The engine-writable slice of a coin's state.
///
/// Deliberately carries no `in_message`: that flag is owned by the
/// dashboard and must never be written from this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinUpdate {
    pub id: CoinId,
    pub symbol: Option<String>,
    pub price: Option<Decimal>,
    pub price_previous: Option<Decimal>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// A timestamped announcement message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// The four abstract storage operations.
///
/// Implementations are assumed fast and local; the engine calls them
/// synchronously from its cycle. On error they must release whatever
/// backend handle they hold before returning, so a crashed cycle never
/// leaves storage locked for the dashboard process.
pub trait CoinStore {
    /// The full watch set, in display order.
    fn load_watch_set(&mut self) -> Result<Vec<CoinRecord>, StoreError>;

    /// Upsert-by-id for ids that still exist in storage; unknown ids are
    /// skipped (adding and removing ids is the dashboard's authority).
    /// Applied as one unit.
    fn persist_watch_set(&mut self, updates: &[CoinUpdate]) -> Result<(), StoreError>;

    /// Append one announcement to the message log.
    fn append_log_entry(
        &mut self,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), StoreError>;

    /// The set of currently watched ids.
    fn list_watched_ids(&mut self) -> Result<HashSet<CoinId>, StoreError>;
}
