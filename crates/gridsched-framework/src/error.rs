//! Framework error types.

use thiserror::Error;

/// Errors raised while setting up a scheduling session.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("failed to read scheduler configuration {path}: {source}")]
    ConfRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scheduler configuration: {0}")]
    ConfParse(#[from] toml::de::Error),
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;

/// Errors raised by cache backends and metrics sources.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("metrics source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid metrics for node {node}: {reason}")]
    InvalidMetrics { node: String, reason: String },
}

pub type CacheResult<T> = Result<T, CacheError>;
