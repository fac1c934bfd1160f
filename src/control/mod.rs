//! Control channel — the loopback message boundary between the engine and
//! the dashboard process.
//!
//! One persistent WebSocket connection: the engine connects
//! ([`channel::ControlChannel`]), the dashboard listens
//! ([`listener::ControlListener`]). Payloads are discrete, ordered JSON
//! text frames; this module defines the shared vocabulary and config.
//!
//! Delivery is at-least-once. Both endpoints poll non-blockingly — the
//! engine's timer loop never stalls waiting on the dashboard, and vice
//! versa.

pub mod channel;
pub mod listener;

pub use channel::ControlChannel;
pub use listener::{ControlListener, ControlPeer};

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─── Engine → dashboard ──────────────────────────────────────────────────────

/// Status notifications sent by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineMsg {
    /// Upstream reachable; clears any previously shown error state.
    /// Idempotent — safe to send when no error was ever announced.
    #[serde(rename = "connected")]
    Connected,
    /// Upstream unreachable; the dashboard should surface a degraded-state
    /// indicator.
    #[serde(rename = "connection_error")]
    ConnectionError,
}

// ─── Dashboard → engine ──────────────────────────────────────────────────────

/// Commands sent by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DashboardMsg {
    /// Interrupt the engine's current sleep and run the cycle immediately.
    #[serde(rename = "request_update")]
    RequestUpdate,
    /// Use this literal string as the next single announcement instead of
    /// the derived one.
    #[serde(rename = "override")]
    Override { override_text: String },
}

// ─── StatusSink ──────────────────────────────────────────────────────────────

/// Any receiver of engine connectivity notifications.
///
/// Implemented by [`ControlChannel`] (the real thing), by `()` (no channel
/// attached), and by test collectors. Notification is fire-and-forget: a
/// full or dead channel must never stall the notifier.
pub trait StatusSink {
    fn notify(&self, msg: EngineMsg);
}

impl StatusSink for () {
    fn notify(&self, _msg: EngineMsg) {}
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Configuration for the engine-side control channel.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Dashboard endpoint, e.g. `ws://127.0.0.1:6000`.
    pub url: String,
    /// Startup handshake bound: if the dashboard is not accepting within
    /// this window, the connect attempt fails instead of blocking forever.
    pub connect_timeout: Duration,
    /// Reconnect in the background after an established connection drops.
    pub reconnect: bool,
    /// Base delay for the exponential reconnect backoff.
    pub base_reconnect_delay_ms: u32,
    /// Give up after this many consecutive failed reconnect attempts.
    pub max_reconnect_attempts: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            url: crate::network::DEFAULT_CONTROL_URL.to_string(),
            connect_timeout: Duration::from_secs(30),
            reconnect: true,
            base_reconnect_delay_ms: 2000,
            max_reconnect_attempts: 10,
        }
    }
}
