//! Error types for the connector.
//!
//! # Design
//! Only failures that stop the connector from being built are Rust errors.
//! Failures of a single call (bad header JSON, transport errors, unusable
//! responses) are reported through `ActionResult` instead, because the
//! response metadata still has to reach the caller.

use thiserror::Error;

/// Errors returned by `Connector::initialize`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `base_url` has no scheme or no hostname.
    #[error("Failed to parse URL ({0}). Should look like \"http(s)://location/optional_path\"")]
    InvalidBaseUrl(String),

    /// `base_url` resolves to an address in 127.0.0.0/8.
    #[error("Accessing 127.0.0.1 is not allowed")]
    LoopbackTarget,

    #[error("Given timeout value is not a valid integer")]
    InvalidTimeout,
}

/// Errors raised while executing a request on the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
