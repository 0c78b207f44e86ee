//! Simulate command - replay a request schedule against a simulated sync.
//!
//! Time is driven by a manual clock starting at a fixed instant, so the
//! schedule is replayed instantly and deterministically apart from the
//! simulated failures. Failed syncs are retried at the same instant, the
//! way a client would retry a transient error.

use anyhow::{Context, Result};
use clap::Args;
use std::time::Duration;
use sync_gate_coordinator::{AdmissionCoordinator, Config, MetricsSnapshot, SimulatedSync};
use sync_gate_core::ManualClock;
use sync_gate_types::{SyncResult, Timestamp, UserId};

/// January 1, 2021 00:00:00 UTC.
pub const SIMULATION_START: Timestamp = Timestamp::from_secs(1_609_459_200);

/// Arguments for `sync-gate simulate`.
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// User to sync for
    #[arg(long, short, default_value = "a")]
    pub user: UserId,

    /// Request type (automated, user-app-open, user-request)
    #[arg(long, short = 't')]
    pub request_type: String,

    /// Minute offsets of each request, comma separated (e.g. 0,1,2,4)
    #[arg(long, value_delimiter = ',', required = true)]
    pub at: Vec<u32>,

    /// Override the simulated failure rate
    #[arg(long)]
    pub failure_rate: Option<f64>,

    /// Override the maximum simulated sync latency
    #[arg(long)]
    pub max_latency_ms: Option<u64>,

    /// Report failed syncs instead of retrying them
    #[arg(long)]
    pub no_retry: bool,
}

/// Outcome of one scheduled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledOutcome {
    /// Minute offset of the request.
    pub minute: u32,
    /// Final result after retries.
    pub result: SyncResult,
    /// Number of attempts made (1 unless retried).
    pub attempts: u32,
}

/// Replay the schedule and print one line per request.
pub async fn run(config: &Config, args: &SimulateArgs) -> Result<()> {
    let (outcomes, metrics) = replay(config, args).await?;

    for outcome in &outcomes {
        println!(
            "→ {} for {} at +{}m: {} (attempts: {})",
            args.request_type, args.user, outcome.minute, outcome.result, outcome.attempts
        );
    }

    let synced = outcomes.iter().filter(|o| o.result.is_successful()).count();
    let limited = outcomes.iter().filter(|o| o.result.is_rate_limited()).count();
    println!(
        "Schedule: {} of {} requests synced, {} rate limited",
        synced,
        outcomes.len(),
        limited
    );
    println!(
        "Summary: {} attempts ({} completed), {} successful, {} failed, {} rate limited",
        metrics.attempts_total,
        metrics.completed_total(),
        metrics.successful_total,
        metrics.failed_total,
        metrics.rate_limited_total
    );
    Ok(())
}

/// Replay the schedule and return each request's outcome.
pub async fn replay(
    config: &Config,
    args: &SimulateArgs,
) -> Result<(Vec<ScheduledOutcome>, MetricsSnapshot)> {
    let mut config = config.clone();
    if let Some(rate) = args.failure_rate {
        config.simulation.failure_rate = rate;
    }
    if let Some(latency) = args.max_latency_ms {
        config.simulation.max_latency_ms = latency;
    }

    let clock = ManualClock::new(SIMULATION_START);
    let operation = SimulatedSync::from_config(&config.simulation);
    tracing::info!(
        "Simulated sync: failure_rate={} max_latency={:?}",
        operation.failure_rate(),
        operation.max_latency()
    );
    let coordinator = AdmissionCoordinator::from_config(&config, operation, clock.clone())
        .context("Invalid simulation settings")?;
    let max_retries = config.simulation.max_retries;

    let mut outcomes = Vec::with_capacity(args.at.len());
    for &minute in &args.at {
        clock.set(SIMULATION_START.saturating_add(Duration::from_secs(u64::from(minute) * 60)));

        let mut attempts = 1;
        let mut result = coordinator
            .attempt_sync_named(&args.user, &args.request_type)
            .await;
        // Only failures are retried; a rate-limited request stays denied.
        while !settled(result) && !args.no_retry && attempts <= max_retries {
            tracing::info!("Retrying failed sync at +{}m (attempt {})", minute, attempts + 1);
            attempts += 1;
            result = coordinator
                .attempt_sync_named(&args.user, &args.request_type)
                .await;
        }

        outcomes.push(ScheduledOutcome {
            minute,
            result,
            attempts,
        });
    }

    Ok((outcomes, coordinator.metrics().snapshot()))
}

fn settled(result: SyncResult) -> bool {
    result.is_successful() || result.is_rate_limited()
}
