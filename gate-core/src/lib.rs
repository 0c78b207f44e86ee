//! # sync-gate-core
//!
//! Pure admission logic for sync-gate (no I/O, instant tests).
//!
//! This crate decides whether a sync request may run and how a user's
//! record changes once an admitted sync succeeds. It never performs the
//! sync, never locks, and never reads the wall clock on its own.
//!
//! ## Design Philosophy
//!
//! The policy engine is **pure** - it takes a request type, an instant and a
//! record, and produces a decision. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about window resets
//!
//! Serialization, the sync call itself and state storage live in
//! `sync-gate-coordinator`, which interprets the decisions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod policy;
pub mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::{
    Decision, DenyReason, Policies, TierPolicy, DEFAULT_AUTOMATED_INTERVAL, DEFAULT_LONG_WINDOW,
    DEFAULT_SHORT_WINDOW,
};
pub use record::{UserRecord, WindowCounter};
