//! Dashboard-side display helpers.
//!
//! The web front-end lives in its own process; these are the pieces of its
//! behavior that belong to the engine crate because they interpret engine
//! state: the "next update" estimate and the degraded-connection banner fed
//! by control channel status notifications.

use crate::control::EngineMsg;
use crate::domain::coin::state::WatchSet;
use std::time::Duration;

/// Banner text shown while the engine reports the upstream as unreachable.
pub const DEGRADED_TEXT: &str = "Connection error, attempting to re-connect";

/// Best-effort estimate of when the next update lands, as `HH:MM:SS`.
///
/// Derived from the first coin's `last_updated` plus the update interval;
/// `"N/A"` when there is nothing to derive it from (no coins, or none ever
/// refreshed).
pub fn next_update_string(watch: &WatchSet, update_interval: Duration) -> String {
    match watch.first().and_then(|coin| coin.last_updated()) {
        Some(last_updated) => {
            let next = last_updated + chrono::Duration::seconds(update_interval.as_secs() as i64);
            next.format("%H:%M:%S").to_string()
        }
        None => "N/A".to_string(),
    }
}

/// Degraded-state indicator, driven by polled status notifications.
///
/// `ConnectionError` raises the banner; it stays up until a subsequent
/// `Connected` clears it (the engine sends `Connected` on every successful
/// upstream call, so recovery is prompt).
#[derive(Debug, Default, Clone, Copy)]
pub struct StatusBanner {
    degraded: bool,
}

impl StatusBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, msg: EngineMsg) {
        self.degraded = match msg {
            EngineMsg::ConnectionError => true,
            EngineMsg::Connected => false,
        };
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The banner line to render, if any.
    pub fn text(&self) -> Option<&'static str> {
        self.degraded.then_some(DEGRADED_TEXT)
    }
}
