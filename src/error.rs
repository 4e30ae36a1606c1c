use thiserror::Error;

use crate::session::SessionState;

/// Failure talking to the ledger service.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("ledger answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("a mining cycle is already running (state: {0})")]
    Busy(SessionState),
}

/// A chain that breaks the block linkage or hash rules.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("block at position {position} has index {index}")]
    IndexGap { position: usize, index: u64 },

    #[error("block {index} does not link to the hash of its predecessor")]
    BrokenLink { index: u64 },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: u64 },
}
