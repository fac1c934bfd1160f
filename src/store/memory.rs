//! In-memory store — a cloneable handle over shared state.
//!
//! Backs tests and demos: clones share the same records and log, so a test
//! can mutate storage "behind the engine's back" between cycles the same
//! way the dashboard process does in production.

use super::{CoinRecord, CoinStore, CoinUpdate, LogEntry};
use crate::error::StoreError;
use crate::shared::CoinId;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    records: Vec<CoinRecord>,
    log: Vec<LogEntry>,
    fail_next_persist: bool,
}

/// Shared-state in-memory implementation of [`CoinStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CoinRecord>) -> Self {
        let store = Self::new();
        store.set_records(records);
        store
    }

    /// Replace the whole watch set, as the dashboard would.
    pub fn set_records(&self, records: Vec<CoinRecord>) {
        self.inner.lock().unwrap().records = records;
    }

    /// Remove one id, as the dashboard's delete action would.
    pub fn remove(&self, id: &CoinId) {
        self.inner
            .lock()
            .unwrap()
            .records
            .retain(|record| &record.id != id);
    }

    /// Flip the dashboard-owned membership flag.
    pub fn set_in_message(&self, id: &CoinId, in_message: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.records.iter_mut().find(|record| &record.id == id) {
            record.in_message = in_message;
        }
    }

    pub fn records(&self) -> Vec<CoinRecord> {
        self.inner.lock().unwrap().records.clone()
    }

    pub fn log(&self) -> Vec<LogEntry> {
        self.inner.lock().unwrap().log.clone()
    }

    /// Make the next `persist_watch_set` fail, for crash-path tests.
    pub fn fail_next_persist(&self) {
        self.inner.lock().unwrap().fail_next_persist = true;
    }
}

impl CoinStore for MemoryStore {
    fn load_watch_set(&mut self) -> Result<Vec<CoinRecord>, StoreError> {
        Ok(self.inner.lock().unwrap().records.clone())
    }

    fn persist_watch_set(&mut self, updates: &[CoinUpdate]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_next_persist {
            inner.fail_next_persist = false;
            return Err(StoreError::Other("injected persist failure".into()));
        }
        for update in updates {
            if let Some(record) = inner
                .records
                .iter_mut()
                .find(|record| record.id == update.id)
            {
                record.symbol = update.symbol.clone();
                record.price = update.price;
                record.price_previous = update.price_previous;
                record.last_updated = update.last_updated;
            }
        }
        Ok(())
    }

    fn append_log_entry(
        &mut self,
        timestamp: DateTime<Utc>,
        message: &str,
    ) -> Result<(), StoreError> {
        self.inner.lock().unwrap().log.push(LogEntry {
            timestamp,
            message: message.to_string(),
        });
        Ok(())
    }

    fn list_watched_ids(&mut self) -> Result<HashSet<CoinId>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .iter()
            .map(|record| record.id.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> Vec<CoinRecord> {
        vec![CoinRecord {
            id: CoinId::from("bitcoin"),
            symbol: None,
            price: None,
            price_previous: None,
            in_message: true,
            last_updated: None,
        }]
    }

    #[test]
    fn test_persist_updates_only_existing_ids() {
        let store = MemoryStore::with_records(seed());
        let mut handle = store.clone();

        let updates = vec![
            CoinUpdate {
                id: CoinId::from("bitcoin"),
                symbol: Some("btc".into()),
                price: None,
                price_previous: None,
                last_updated: None,
            },
            CoinUpdate {
                id: CoinId::from("unknown"),
                symbol: Some("???".into()),
                price: None,
                price_previous: None,
                last_updated: None,
            },
        ];
        handle.persist_watch_set(&updates).unwrap();

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol.as_deref(), Some("btc"));
    }

    #[test]
    fn test_persist_never_touches_membership_flag() {
        let store = MemoryStore::with_records(seed());
        let mut handle = store.clone();
        handle
            .persist_watch_set(&[CoinUpdate {
                id: CoinId::from("bitcoin"),
                symbol: None,
                price: None,
                price_previous: None,
                last_updated: None,
            }])
            .unwrap();
        assert!(store.records()[0].in_message);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let store = MemoryStore::with_records(seed());
        let mut handle = store.clone();
        store.fail_next_persist();
        assert!(handle.persist_watch_set(&[]).is_err());
        assert!(handle.persist_watch_set(&[]).is_ok());
    }

    #[test]
    fn test_list_watched_ids() {
        let mut store = MemoryStore::with_records(seed());
        let ids = store.list_watched_ids().unwrap();
        assert!(ids.contains(&CoinId::from("bitcoin")));
        assert_eq!(ids.len(), 1);
    }
}
