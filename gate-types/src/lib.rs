//! # sync-gate-types
//!
//! Shared types for the sync-gate admission controller.
//!
//! This crate provides the foundational types used across all sync-gate crates:
//! - [`UserId`] - Identity of the user a sync runs for
//! - [`Timestamp`] - Millisecond wall-clock instants
//! - [`RequestType`] - Why a sync was requested (each has its own limits)
//! - [`SyncResult`] - Outcome of every admission attempt
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod request;
mod time;

pub use error::TypesError;
pub use ids::UserId;
pub use request::{RequestType, SyncResult};
pub use time::Timestamp;
