//! Engine configuration — an explicit value constructed at process startup
//! and passed into the engine, no mutable globals.

use crate::control::ControlConfig;
use crate::source::BackoffPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the engine consumes from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pause between update cycles.
    pub update_interval: Duration,
    /// Currency code quoted prices are requested in.
    pub quote_currency: String,
    /// Retry policy for every upstream call.
    pub backoff: BackoffPolicy,
    /// Price source REST base URL.
    pub api_url: String,
    /// Control channel endpoint and tuning.
    pub control: ControlConfig,
    /// Pause before the supervisor re-enters bootstrap after a crash.
    pub restart_cooldown: Duration,
    /// Storage location for the flat-file backend.
    pub store_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_secs(60),
            quote_currency: "usd".to_string(),
            backoff: BackoffPolicy::default(),
            api_url: crate::network::DEFAULT_API_URL.to_string(),
            control: ControlConfig::default(),
            restart_cooldown: Duration::from_secs(10),
            store_dir: PathBuf::from("./ticker-data"),
        }
    }
}

impl EngineConfig {
    /// Build a config from `TICKER_*` environment variables, falling back
    /// to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_u64("TICKER_UPDATE_INTERVAL_SECS") {
            config.update_interval = Duration::from_secs(secs);
        }
        if let Ok(currency) = std::env::var("TICKER_QUOTE_CURRENCY") {
            config.quote_currency = currency;
        }
        if let Some(secs) = env_u64("TICKER_BACKOFF_SECS") {
            config.backoff.interval = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("TICKER_BACKOFF_BUDGET_SECS") {
            config.backoff.budget = Duration::from_secs(secs);
        }
        if let Ok(url) = std::env::var("TICKER_API_URL") {
            config.api_url = url;
        }
        if let Ok(url) = std::env::var("TICKER_CONTROL_URL") {
            config.control.url = url;
        }
        if let Some(secs) = env_u64("TICKER_CONTROL_TIMEOUT_SECS") {
            config.control.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("TICKER_RESTART_COOLDOWN_SECS") {
            config.restart_cooldown = Duration::from_secs(secs);
        }
        if let Ok(dir) = std::env::var("TICKER_STORE_DIR") {
            config.store_dir = PathBuf::from(dir);
        }

        config
    }
}

fn env_u64(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
