//! Admission coordinator.
//!
//! Serializes sync requests per user, asks the policy engine for a
//! decision, runs the sync when admitted, and commits the record only after
//! the sync has succeeded.

use crate::config::Config;
use crate::error::Result;
use crate::metrics::AdmissionMetrics;
use crate::operation::{SyncOperation, SyncOperationError};
use crate::store::UserStore;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use sync_gate_core::{Clock, Decision, Policies, SystemClock, UserRecord};
use sync_gate_types::{RequestType, SyncResult, UserId};

/// Per-user, multi-tier admission controller for sync requests.
///
/// Cheap to clone; clones share records, metrics and the sync operation.
pub struct AdmissionCoordinator<S, C = SystemClock> {
    inner: Arc<Inner<S, C>>,
}

struct Inner<S, C> {
    policies: Policies,
    sync_timeout: Option<Duration>,
    operation: S,
    clock: C,
    store: UserStore,
    metrics: AdmissionMetrics,
}

impl<S, C> Clone for AdmissionCoordinator<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, C> std::fmt::Debug for AdmissionCoordinator<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionCoordinator")
            .field("policies", &self.inner.policies)
            .field("sync_timeout", &self.inner.sync_timeout)
            .field("users", &self.inner.store.len())
            .field("metrics", &self.inner.metrics)
            .finish_non_exhaustive()
    }
}

impl<S: SyncOperation> AdmissionCoordinator<S, SystemClock> {
    /// Create a coordinator with the default policy and the wall clock.
    pub fn new(operation: S) -> Self {
        Self::with_clock(operation, SystemClock)
    }
}

impl<S: SyncOperation, C: Clock> AdmissionCoordinator<S, C> {
    /// Create a coordinator with the default policy and a custom clock.
    pub fn with_clock(operation: S, clock: C) -> Self {
        Self::with_settings(Policies::default(), None, operation, clock)
    }

    /// Create a coordinator with explicit policy and sync timeout.
    pub fn with_settings(
        policies: Policies,
        sync_timeout: Option<Duration>,
        operation: S,
        clock: C,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                policies,
                sync_timeout,
                operation,
                clock,
                store: UserStore::new(),
                metrics: AdmissionMetrics::default(),
            }),
        }
    }

    /// Create a coordinator from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn from_config(config: &Config, operation: S, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_settings(
            config.policies(),
            config.sync_timeout(),
            operation,
            clock,
        ))
    }

    /// The policy table in force.
    pub fn policies(&self) -> &Policies {
        &self.inner.policies
    }

    /// Operational counters.
    pub fn metrics(&self) -> &AdmissionMetrics {
        &self.inner.metrics
    }

    /// The per-user record store.
    pub fn store(&self) -> &UserStore {
        &self.inner.store
    }

    /// Copy of a user's record, waiting for any in-flight request first.
    pub async fn snapshot(&self, user_id: &UserId) -> Option<UserRecord> {
        self.inner.store.snapshot(user_id).await
    }

    /// Attempt a sync for `user_id`.
    ///
    /// Waits behind any in-flight request for the same user, then returns
    /// [`SyncResult::RateLimited`] if the policy denies the request,
    /// [`SyncResult::Successful`] if the sync ran and completed, or
    /// [`SyncResult::Failed`] if it ran and did not.
    ///
    /// The attempt runs on its own task. Dropping the returned future does
    /// not cancel the sync; its outcome is still committed and the user's
    /// slot is still released.
    pub async fn attempt_sync(&self, user_id: &UserId, request_type: RequestType) -> SyncResult {
        self.inner.metrics.record_attempt();

        let inner = Arc::clone(&self.inner);
        let owned_id = user_id.clone();
        let task = tokio::spawn(async move { inner.run_attempt(owned_id, request_type).await });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(
                    "Sync attempt task aborted: user={} type={}: {}",
                    user_id,
                    request_type,
                    e
                );
                self.inner.metrics.record_failure();
                SyncResult::Failed
            }
        }
    }

    /// Attempt a sync with the request type given by name.
    ///
    /// Unrecognized names are answered with [`SyncResult::RateLimited`]
    /// without running anything.
    pub async fn attempt_sync_named(&self, user_id: &UserId, request_type: &str) -> SyncResult {
        match request_type.parse::<RequestType>() {
            Ok(parsed) => self.attempt_sync(user_id, parsed).await,
            Err(e) => {
                self.inner.metrics.record_attempt();
                // The user still counts as seen.
                let _ = self.inner.store.slot(user_id);
                tracing::warn!("Rejecting sync for user={}: {}", user_id, e);
                self.inner.metrics.record_rate_limited();
                SyncResult::RateLimited
            }
        }
    }
}

impl<S: SyncOperation, C: Clock> Inner<S, C> {
    async fn run_attempt(&self, user_id: UserId, request_type: RequestType) -> SyncResult {
        let slot = self.store.slot(&user_id);
        let mut record = slot.lock().await;
        let now = self.clock.now();

        if let Decision::Deny(reason) = self.policies.evaluate(request_type, now, &record) {
            tracing::debug!(
                "Rate limited: user={} type={} ({})",
                user_id,
                request_type,
                reason
            );
            self.metrics.record_rate_limited();
            return SyncResult::RateLimited;
        }

        tracing::debug!("Admitted: user={} type={} at {}", user_id, request_type, now);

        match self.perform(&user_id).await {
            Ok(()) => {
                self.policies.commit_success(request_type, now, &mut record);
                self.metrics.record_success();
                tracing::debug!("Sync succeeded: user={} type={}", user_id, request_type);
                SyncResult::Successful
            }
            Err(e) => {
                self.metrics.record_failure();
                tracing::warn!("Sync failed: user={} type={}: {}", user_id, request_type, e);
                SyncResult::Failed
            }
        }
    }

    async fn perform(&self, user_id: &UserId) -> std::result::Result<(), SyncOperationError> {
        let call = AssertUnwindSafe(self.operation.perform_sync(user_id)).catch_unwind();

        let outcome = match self.sync_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(SyncOperationError::Timeout(limit)),
            },
            None => call.await,
        };

        outcome.unwrap_or(Err(SyncOperationError::Panicked))
    }
}
