//! Shared newtypes and price formatting used across all modules.
//!
//! These types are serialization-transparent: they serialize/deserialize
//! identically to the raw strings the storage layer and the price source
//! exchange, so they can be used directly in wire and record types.

pub mod price;

pub use price::{format_price, parse_decimal, round_to_string};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── CoinId ──────────────────────────────────────────────────────────────────

/// Newtype for price-source asset identifiers (e.g. `"bitcoin"`).
///
/// The id is the join key against storage and is unique within the watch
/// set. Serializes transparently as a JSON string; usable as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoinId(String);

impl CoinId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CoinId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CoinId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for CoinId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CoinId(s.to_string()))
    }
}

impl Serialize for CoinId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CoinId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(CoinId(s))
    }
}
