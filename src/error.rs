//! Error types for queuescope
//!
//! One enum covers the whole collection core: admin-call failures, stats and
//! sample parsing, snapshot file IO, and configuration problems. Background
//! cycles log these and retry on their next scheduled tick rather than
//! surfacing them to a caller.

use thiserror::Error;

/// Result type alias for queuescope operations
pub type Result<T> = std::result::Result<T, CollectError>;

/// Main error type for the collection core
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Admin call failed: {0}")]
    Admin(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Runtime stat missing: {0}")]
    StatMissing(String),
}

impl CollectError {
    /// Create an admin error with operation context
    ///
    /// # Example
    /// ```ignore
    /// CollectError::admin("fetch_broker_runtime_stats", "connection refused")
    /// // produces: "Admin call failed: fetch_broker_runtime_stats: connection refused"
    /// ```
    pub fn admin(op: &str, cause: impl std::fmt::Display) -> Self {
        CollectError::Admin(format!("{}: {}", op, cause))
    }

    /// Create a parse error from a message string
    pub fn parse_msg(msg: impl Into<String>) -> Self {
        CollectError::Parse(msg.into())
    }
}
