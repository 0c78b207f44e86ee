//! CLI command implementations.

pub mod policy;
pub mod simulate;
