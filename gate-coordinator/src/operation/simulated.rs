//! Simulated remote sync with random latency and failures.

use super::{SyncOperation, SyncOperationError};
use crate::config::SimulationConfig;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use sync_gate_types::UserId;

/// Stand-in for a remote data scrape.
///
/// Each call sleeps for a uniformly random time up to `max_latency` and
/// then fails with probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct SimulatedSync {
    failure_rate: f64,
    max_latency: Duration,
}

impl SimulatedSync {
    /// Create a simulated sync.
    ///
    /// `failure_rate` is clamped to `[0, 1]`.
    pub fn new(failure_rate: f64, max_latency: Duration) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            failure_rate,
            max_latency,
        }
    }

    /// Create a simulated sync from the `[simulation]` config section.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.failure_rate,
            Duration::from_millis(config.max_latency_ms),
        )
    }

    /// Probability that a call fails.
    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Upper bound on the latency of a call.
    pub fn max_latency(&self) -> Duration {
        self.max_latency
    }
}

impl Default for SimulatedSync {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

#[async_trait]
impl SyncOperation for SimulatedSync {
    async fn perform_sync(&self, user_id: &UserId) -> Result<(), SyncOperationError> {
        let (latency, fails) = {
            let mut rng = rand::thread_rng();
            let max_ms = u64::try_from(self.max_latency.as_millis()).unwrap_or(u64::MAX);
            (
                Duration::from_millis(rng.gen_range(0..=max_ms)),
                rng.gen_bool(self.failure_rate),
            )
        };

        tokio::time::sleep(latency).await;

        if fails {
            tracing::debug!("Simulated sync failed for user={} after {:?}", user_id, latency);
            Err(SyncOperationError::Unavailable(format!(
                "simulated scrape failed for {}",
                user_id
            )))
        } else {
            Ok(())
        }
    }
}
