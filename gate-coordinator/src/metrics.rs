//! Operational counters for the admission coordinator.

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational metrics for monitoring admission activity.
///
/// All counters are monotonically increasing (reset only on restart).
/// Thread-safe via `AtomicU64`, no locks needed for incrementing.
#[derive(Debug, Default)]
pub struct AdmissionMetrics {
    /// Total calls to `attempt_sync` (and `attempt_sync_named`).
    pub attempts_total: AtomicU64,
    /// Attempts that ran a sync which completed.
    pub successful_total: AtomicU64,
    /// Attempts that ran a sync which failed, timed out or panicked.
    pub failed_total: AtomicU64,
    /// Attempts denied by policy (including unknown request types).
    pub rate_limited_total: AtomicU64,
}

impl AdmissionMetrics {
    /// Read all counters at once.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts_total: self.attempts_total.load(Ordering::Relaxed),
            successful_total: self.successful_total.load(Ordering::Relaxed),
            failed_total: self.failed_total.load(Ordering::Relaxed),
            rate_limited_total: self.rate_limited_total.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn record_attempt(&self) {
        self.attempts_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.successful_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rate_limited(&self) {
        self.rate_limited_total.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`AdmissionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total attempts.
    pub attempts_total: u64,
    /// Successful syncs.
    pub successful_total: u64,
    /// Failed syncs.
    pub failed_total: u64,
    /// Rate-limited attempts.
    pub rate_limited_total: u64,
}

impl MetricsSnapshot {
    /// Attempts that have produced a result so far.
    pub fn completed_total(&self) -> u64 {
        self.successful_total + self.failed_total + self.rate_limited_total
    }
}
