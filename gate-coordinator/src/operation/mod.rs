//! Sync operation abstraction for sync-gate.
//!
//! The coordinator does not know what a sync does. It only needs an async
//! call that eventually succeeds or fails for a given user:
//! - [`SimulatedSync`] for demos, with random latency and failures
//! - [`MockSyncOperation`] for tests, with scripted outcomes
//!
//! # Example
//!
//! ```ignore
//! let operation = MockSyncOperation::new();
//! operation.fail_next("upstream unavailable");
//! assert!(operation.perform_sync(&UserId::from("a")).await.is_err());
//! ```

mod mock;
mod simulated;

pub use mock::MockSyncOperation;
pub use simulated::SimulatedSync;

use async_trait::async_trait;
use std::time::Duration;
use sync_gate_types::UserId;
use thiserror::Error;

/// Sync operation errors.
///
/// The coordinator treats every variant the same way: the attempt is
/// reported as failed and nothing is committed.
#[derive(Debug, Error)]
pub enum SyncOperationError {
    /// The sync ran and reported failure.
    #[error("sync failed: {0}")]
    Failed(String),

    /// The upstream data source could not be reached.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The sync did not finish within the configured timeout.
    #[error("sync timed out after {0:?}")]
    Timeout(Duration),

    /// The sync panicked.
    #[error("sync panicked")]
    Panicked,
}

/// The external work gated by the coordinator.
///
/// Implementations may take arbitrarily long and may fail for any reason.
#[async_trait]
pub trait SyncOperation: Send + Sync + 'static {
    /// Run a sync for `user_id`.
    async fn perform_sync(&self, user_id: &UserId) -> Result<(), SyncOperationError>;
}
