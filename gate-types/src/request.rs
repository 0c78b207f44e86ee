//! Request and result enumerations.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a sync was requested.
///
/// Every request type carries its own rate-limit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Background sync scheduled by the system.
    Automated,
    /// Sync triggered by the user opening the app.
    UserAppOpen,
    /// Sync explicitly requested by the user.
    UserRequest,
}

impl RequestType {
    /// All request types, in declaration order.
    pub const ALL: [RequestType; 3] = [
        RequestType::Automated,
        RequestType::UserAppOpen,
        RequestType::UserRequest,
    ];

    /// Canonical name of this request type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automated => "Automated",
            Self::UserAppOpen => "UserAppOpen",
            Self::UserRequest => "UserRequest",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = TypesError;

    /// Accepts `UserAppOpen`, `user_app_open` and `user-app-open` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "automated" => Ok(Self::Automated),
            "userappopen" => Ok(Self::UserAppOpen),
            "userrequest" => Ok(Self::UserRequest),
            _ => Err(TypesError::UnknownRequestType(s.to_string())),
        }
    }
}

/// Outcome of a sync admission attempt.
///
/// Every attempt produces exactly one of these; failures are values, not
/// errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncResult {
    /// Admitted, and the sync completed.
    Successful,
    /// Admitted, but the sync did not complete. Safe to retry.
    Failed,
    /// Denied by the rate-limit policy.
    RateLimited,
}

impl SyncResult {
    /// Canonical name of this result.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Successful => "Successful",
            Self::Failed => "Failed",
            Self::RateLimited => "RateLimited",
        }
    }

    /// True for [`SyncResult::Successful`].
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }

    /// True for [`SyncResult::RateLimited`].
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

impl fmt::Display for SyncResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
