//! Flat-file store — a watch-set document plus an append-only message log.
//!
//! The reference backend for the standalone `tickerd` daemon. The watch set
//! lives in `watch_set.json`; announcements append to `message_log.jsonl`,
//! one JSON object per line. Rewrites go through a temp file + rename so a
//! crash mid-write never corrupts the document, and every operation opens
//! and closes its own file handles — nothing stays locked across an error.

use super::{CoinRecord, CoinStore, CoinUpdate, LogEntry};
use crate::error::StoreError;
use crate::shared::CoinId;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const WATCH_SET_FILE: &str = "watch_set.json";
const MESSAGE_LOG_FILE: &str = "message_log.jsonl";

/// File-backed implementation of [`CoinStore`].
#[derive(Debug, Clone)]
pub struct JsonStore {
    watch_path: PathBuf,
    log_path: PathBuf,
}

impl JsonStore {
    /// Open (or lazily create) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            watch_path: dir.join(WATCH_SET_FILE),
            log_path: dir.join(MESSAGE_LOG_FILE),
        })
    }

    fn read_records(&self) -> Result<Vec<CoinRecord>, StoreError> {
        if !self.watch_path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.watch_path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_records(&self, records: &[CoinRecord]) -> Result<(), StoreError> {
        let tmp_path = self.watch_path.with_extension("json.tmp");
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(&tmp_path, raw)?;
        fs::rename(&tmp_path, &self.watch_path)?;
        Ok(())
    }
}

impl CoinStore for JsonStore {
    fn load_watch_set(&mut self) -> Result<Vec<CoinRecord>, StoreError> {
        self.read_records()
    }

    fn persist_watch_set(&mut self, updates: &[CoinUpdate]) -> Result<(), StoreError> {
        // Re-read before writing: ids deleted by the dashboard since the
        // last reload must not be resurrected.
        let mut records = self.read_records()?;
        for update in updates {
            if let Some(record) = records.iter_mut().find(|record| record.id == update.id) {
                record.symbol = update.symbol.clone();
                record.price = update.price;
                record.price_previous = update.price_previous;
                record.last_updated = update.last_updated;
            }
        }
        self.write_records(&records)
    }

    fn append_log_entry(
        &mut self,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), StoreError> {
        let entry = LogEntry {
            timestamp,
            message: message.to_string(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    fn list_watched_ids(&mut self) -> Result<HashSet<CoinId>, StoreError> {
        Ok(self
            .read_records()?
            .iter()
            .map(|record| record.id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ticker-json-store-{tag}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn seed_record(id: &str) -> CoinRecord {
        CoinRecord {
            id: CoinId::from(id),
            symbol: None,
            price: None,
            price_previous: None,
            in_message: true,
            last_updated: None,
        }
    }

    #[test]
    fn test_load_from_missing_file_is_empty() {
        let mut store = JsonStore::open(temp_dir("missing")).unwrap();
        assert!(store.load_watch_set().unwrap().is_empty());
        assert!(store.list_watched_ids().unwrap().is_empty());
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = temp_dir("roundtrip");
        let mut store = JsonStore::open(&dir).unwrap();
        store.write_records(&[seed_record("bitcoin")]).unwrap();

        let update = CoinUpdate {
            id: CoinId::from("bitcoin"),
            symbol: Some("btc".into()),
            price: Some(Decimal::from_str("101.5").unwrap()),
            price_previous: Some(Decimal::from_str("100").unwrap()),
            last_updated: Some(Utc::now()),
        };
        store.persist_watch_set(&[update.clone()]).unwrap();

        let records = store.load_watch_set().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol.as_deref(), Some("btc"));
        assert_eq!(records[0].price, update.price);
        assert_eq!(records[0].price_previous, update.price_previous);
        // The dashboard-owned flag is untouched by a persist.
        assert!(records[0].in_message);
    }

    #[test]
    fn test_persist_skips_deleted_ids() {
        let dir = temp_dir("deleted");
        let mut store = JsonStore::open(&dir).unwrap();
        store.write_records(&[seed_record("tron")]).unwrap();

        store
            .persist_watch_set(&[CoinUpdate {
                id: CoinId::from("bitcoin"),
                symbol: Some("btc".into()),
                price: None,
                price_previous: None,
                last_updated: None,
            }])
            .unwrap();

        let ids = store.list_watched_ids().unwrap();
        assert!(ids.contains(&CoinId::from("tron")));
        assert!(!ids.contains(&CoinId::from("bitcoin")));
    }

    #[test]
    fn test_message_log_appends_in_order() {
        let dir = temp_dir("log");
        let mut store = JsonStore::open(&dir).unwrap();
        store.append_log_entry(Utc::now(), "BTC-1.00").unwrap();
        store.append_log_entry(Utc::now(), "").unwrap();

        let raw = fs::read_to_string(dir.join(MESSAGE_LOG_FILE)).unwrap();
        let entries: Vec<LogEntry> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "BTC-1.00");
        assert_eq!(entries[1].message, "");
    }
}
