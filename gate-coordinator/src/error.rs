//! Error types for sync-gate-coordinator.
//!
//! These only surface while building a coordinator. Once running,
//! `attempt_sync` reports every outcome as a `SyncResult`.

/// Main error type for coordinator setup.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for coordinator setup.
pub type Result<T> = std::result::Result<T, GateError>;
