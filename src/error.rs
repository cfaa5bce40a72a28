use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failure talking to the seller order API.
///
/// Recovered locally by callers: a failed fetch means "no data this cycle".
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("order API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed order payload: {0}")]
    Decode(String),
}

/// Error reported by an outbound chat channel for a single send.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel asked us to back off before retrying.
    #[error("rate limited, retry after {0:?}")]
    RetryAfter(Duration),

    /// The channel refused the request (bad media, markup, chat, ...).
    #[error("rejected by channel: {0}")]
    Rejected(String),

    #[error("channel transport error: {0}")]
    Transport(String),
}

/// Terminal delivery failure: even the plain-text tier was refused.
#[derive(Error, Debug, Clone)]
pub enum DeliveryError {
    #[error("text delivery failed: {0}")]
    TextRejected(#[source] ChannelError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
