//! # sync-gate-coordinator
//!
//! Per-user admission coordinator for sync-gate.
//!
//! This crate wraps the pure policy engine from `sync-gate-core` with:
//! - A concurrent per-user record store
//! - Per-user serialization of admission, sync and commit
//! - A pluggable [`SyncOperation`] for the actual sync work
//! - TOML configuration and operational counters
//!
//! ## Flow
//!
//! ```text
//! caller ──► attempt_sync(user, type)
//!                │
//!                ▼
//!        ┌──────────────────┐   per-user lock
//!        │   UserStore      │──────────────┐
//!        └──────────────────┘              │
//!                                          ▼
//!                          Policies::evaluate ── Deny ──► RateLimited
//!                                          │
//!                                        Admit
//!                                          ▼
//!                              SyncOperation::perform_sync
//!                                 │                 │
//!                                Ok                Err
//!                                 ▼                 ▼
//!               Policies::commit_success         Failed
//!                                 ▼
//!                             Successful
//! ```
//!
//! Every path ends in a [`SyncResult`](sync_gate_types::SyncResult); nothing
//! is raised to the caller.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod operation;
pub mod store;

pub use config::{Config, ConfigError};
pub use coordinator::AdmissionCoordinator;
pub use error::GateError;
pub use metrics::{AdmissionMetrics, MetricsSnapshot};
pub use operation::{MockSyncOperation, SimulatedSync, SyncOperation, SyncOperationError};
pub use store::UserStore;
