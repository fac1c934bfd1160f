//! Unified engine error types.

use std::time::Duration;
use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("price source error: {0}")]
    Source(#[from] SourceError),

    #[error("control channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("value error: {0}")]
    Value(#[from] InvalidValue),
}

/// Price-source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network failure or a 4xx/5xx response. Expected to self-resolve;
    /// callers must not distinguish further.
    #[error("transient upstream failure: {reason}")]
    Transient { reason: String },

    /// A sustained transient condition past the retry budget. Fatal to the
    /// current unit of work.
    #[error("upstream unreachable after {attempts} attempts within {budget:?}")]
    Exhausted { attempts: u32, budget: Duration },

    /// Response body that did not decode. A data-integrity error, never
    /// retried.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Control channel errors.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("dashboard endpoint unreachable: {0}")]
    ConnectFailed(String),

    #[error("control channel handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),

    #[error("control channel not connected")]
    NotConnected,

    #[error("control listener bind failed: {0}")]
    BindFailed(String),

    #[error("control accept failed: {0}")]
    AcceptFailed(String),

    #[error("control channel send failed: {0}")]
    SendFailed(String),
}

/// Persistence gateway errors. Implementations must release their backend
/// handle before returning one of these, so an aborted cycle never leaves
/// storage locked.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store data: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// A text value that could not be coerced to a number for price formatting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("value is not numeric: {input:?}")]
pub struct InvalidValue {
    pub input: String,
}
