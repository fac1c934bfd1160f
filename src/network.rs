//! Network endpoint constants for the ticker engine.

/// Default price source REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Default control channel URL. The dashboard listens on this loopback port
/// before the engine starts.
pub const DEFAULT_CONTROL_URL: &str = "ws://127.0.0.1:6000";
