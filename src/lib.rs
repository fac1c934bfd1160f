//! # Ticker Engine
//!
//! The background price-update engine behind a live cryptocurrency ticker
//! dashboard. It periodically refreshes a watched set of coin prices from
//! an external source, persists them, derives a broadcast message, and
//! stays responsive to the dashboard process over a loopback control
//! channel — tolerating upstream outages without crashing or losing state.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Shared** — newtypes and price formatting (banker's rounding)
//! 2. **Domain** — the `Coin` model and the reconciling `WatchSet`
//! 3. **Source** — `PriceSource` trait, CoinGecko client, retry policy
//! 4. **Store** — the persistence gateway trait + reference backends
//! 5. **Control** — the engine ⇄ dashboard message channel
//! 6. **Engine** — the scheduler loop and crash supervision
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ticker_engine::prelude::*;
//!
//! let config = EngineConfig::from_env();
//! let store = JsonStore::open(&config.store_dir)?;
//! let source = CoinGecko::new(&config.api_url);
//!
//! let mut engine = Engine::bootstrap(config, store, source).await?;
//! engine.run().await?;
//! ```

// ── Layer 1: Shared ──────────────────────────────────────────────────────────

/// Shared newtypes and price formatting.
pub mod shared;

/// Unified engine error types.
pub mod error;

/// Network endpoint constants.
pub mod network;

/// Engine configuration.
pub mod config;

// ── Layer 2: Domain ──────────────────────────────────────────────────────────

/// Domain models: coins and the watch set.
pub mod domain;

// ── Layer 3: Source ──────────────────────────────────────────────────────────

/// Price source client, wire types, and the resilient call wrapper.
pub mod source;

// ── Layer 4: Store ───────────────────────────────────────────────────────────

/// Persistence gateway and reference backends.
pub mod store;

// ── Layer 5: Control ─────────────────────────────────────────────────────────

/// Control channel between the engine and dashboard processes.
pub mod control;

// ── Layer 6: Engine ──────────────────────────────────────────────────────────

/// The update cycle scheduler and supervision.
pub mod engine;

/// Dashboard-side display helpers.
pub mod dashboard;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes + formatting
    pub use crate::shared::{format_price, parse_decimal, round_to_string, CoinId};

    // Domain types
    pub use crate::domain::coin::state::WatchSet;
    pub use crate::domain::coin::{Coin, Trend, PLACEHOLDER};

    // Source
    pub use crate::source::{
        with_retry, AssetCatalog, AssetEntry, BackoffPolicy, CoinGecko, PriceSource,
    };

    // Store
    pub use crate::store::{
        CoinRecord, CoinStore, CoinUpdate, JsonStore, LogEntry, MemoryStore,
    };

    // Control channel
    pub use crate::control::{
        ControlChannel, ControlConfig, ControlListener, ControlPeer, DashboardMsg, EngineMsg,
        StatusSink,
    };

    // Engine
    pub use crate::config::EngineConfig;
    pub use crate::engine::{run_supervised, Engine};

    // Dashboard helpers
    pub use crate::dashboard::{next_update_string, StatusBanner};

    // Errors
    pub use crate::error::{
        ChannelError, EngineError, InvalidValue, SourceError, StoreError,
    };

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_CONTROL_URL};
}
