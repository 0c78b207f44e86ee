//! Error types for sync-gate.

use thiserror::Error;

/// Errors produced while parsing or validating shared types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// User id was empty or whitespace only
    #[error("user id must not be empty")]
    EmptyUserId,

    /// Request type name not recognized
    #[error("unknown request type: {0}")]
    UnknownRequestType(String),
}
