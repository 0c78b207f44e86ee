//! Window policy engine.
//!
//! Decides whether a sync may run, and computes how a [`UserRecord`]
//! changes once an admitted sync succeeds.
//!
//! ## Rules
//!
//! | Request type  | Short window   | Long window     |
//! |---------------|----------------|-----------------|
//! | `Automated`   | -              | 1 per 8 hours   |
//! | `UserAppOpen` | 2 per 3 min    | 5 per 30 min    |
//! | `UserRequest` | 1 per 3 min    | 3 per 30 min    |
//!
//! Both windows of a tiered type are measured from the same `window_start`,
//! which is only moved when a success lands after the long window has
//! elapsed. `Automated` is gated by the last success of *any* type.

use crate::record::{UserRecord, WindowCounter};
use std::fmt;
use std::time::Duration;
use sync_gate_types::{RequestType, Timestamp};

/// Minimum spacing between `Automated` syncs (8 hours).
pub const DEFAULT_AUTOMATED_INTERVAL: Duration = Duration::from_secs(8 * 60 * 60);

/// Short window for tiered request types (3 minutes).
pub const DEFAULT_SHORT_WINDOW: Duration = Duration::from_secs(3 * 60);

/// Long window for tiered request types (30 minutes).
pub const DEFAULT_LONG_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Result of evaluating a request against a user's record.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The sync may run.
    Admit,
    /// The sync must not run.
    Deny(DenyReason),
}

impl Decision {
    /// True for [`Decision::Admit`].
    pub fn is_admit(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Which rule denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// An `Automated` request arrived too soon after the last success.
    AutomatedCooldown {
        /// Time until the cooldown ends.
        retry_after: Duration,
    },
    /// The short window's limit has been reached.
    ShortWindowExhausted {
        /// Time until the short window ends.
        retry_after: Duration,
    },
    /// The long window's limit has been reached.
    LongWindowExhausted {
        /// Time until the long window ends.
        retry_after: Duration,
    },
}

impl DenyReason {
    /// Earliest time after which the same rule no longer applies.
    pub fn retry_after(&self) -> Duration {
        match self {
            Self::AutomatedCooldown { retry_after }
            | Self::ShortWindowExhausted { retry_after }
            | Self::LongWindowExhausted { retry_after } => *retry_after,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutomatedCooldown { retry_after } => {
                write!(f, "automated cooldown (retry after {:?})", retry_after)
            }
            Self::ShortWindowExhausted { retry_after } => {
                write!(f, "short window exhausted (retry after {:?})", retry_after)
            }
            Self::LongWindowExhausted { retry_after } => {
                write!(f, "long window exhausted (retry after {:?})", retry_after)
            }
        }
    }
}

/// Two-tier limit for a counted request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    /// Length of the short window.
    pub short_window: Duration,
    /// Successes allowed inside the short window.
    pub short_limit: u32,
    /// Length of the long window. Also the counter reset threshold.
    pub long_window: Duration,
    /// Successes allowed inside the long window.
    pub long_limit: u32,
}

impl TierPolicy {
    /// Create a tier policy.
    pub const fn new(
        short_window: Duration,
        short_limit: u32,
        long_window: Duration,
        long_limit: u32,
    ) -> Self {
        Self {
            short_window,
            short_limit,
            long_window,
            long_limit,
        }
    }

    /// Default `UserAppOpen` policy: 2 per 3 minutes, 5 per 30 minutes.
    pub const fn user_app_open() -> Self {
        Self::new(DEFAULT_SHORT_WINDOW, 2, DEFAULT_LONG_WINDOW, 5)
    }

    /// Default `UserRequest` policy: 1 per 3 minutes, 3 per 30 minutes.
    pub const fn user_request() -> Self {
        Self::new(DEFAULT_SHORT_WINDOW, 1, DEFAULT_LONG_WINDOW, 3)
    }

    fn evaluate(&self, counter: &WindowCounter, now: Timestamp) -> Decision {
        let Some(start) = counter.window_start else {
            return Decision::Admit;
        };
        let elapsed = now.duration_since(start);

        // Long window first: its retry hint is the one that matters when both fire.
        if elapsed < self.long_window && counter.count >= self.long_limit {
            return Decision::Deny(DenyReason::LongWindowExhausted {
                retry_after: self.long_window - elapsed,
            });
        }
        if elapsed < self.short_window && counter.count >= self.short_limit {
            return Decision::Deny(DenyReason::ShortWindowExhausted {
                retry_after: self.short_window - elapsed,
            });
        }
        Decision::Admit
    }

    fn commit(&self, counter: &mut WindowCounter, now: Timestamp) {
        let expired = match counter.window_start {
            None => true,
            Some(start) => now.duration_since(start) >= self.long_window,
        };
        if expired {
            counter.window_start = Some(now);
            counter.count = 0;
        }
        counter.count = counter.count.saturating_add(1);
    }
}

/// Complete rate-limit policy, one rule set per [`RequestType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    /// Minimum time between the last success (of any type) and an
    /// `Automated` sync.
    pub automated_interval: Duration,
    /// Limits for `UserAppOpen`.
    pub user_app_open: TierPolicy,
    /// Limits for `UserRequest`.
    pub user_request: TierPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            automated_interval: DEFAULT_AUTOMATED_INTERVAL,
            user_app_open: TierPolicy::user_app_open(),
            user_request: TierPolicy::user_request(),
        }
    }
}

impl Policies {
    /// The tier policy for `request_type`, if it is a counted type.
    pub fn tier(&self, request_type: RequestType) -> Option<&TierPolicy> {
        match request_type {
            RequestType::Automated => None,
            RequestType::UserAppOpen => Some(&self.user_app_open),
            RequestType::UserRequest => Some(&self.user_request),
        }
    }

    /// Decide whether a `request_type` sync may run at `now`.
    ///
    /// Pure function of its inputs; the record is never modified.
    pub fn evaluate(
        &self,
        request_type: RequestType,
        now: Timestamp,
        record: &UserRecord,
    ) -> Decision {
        match request_type {
            RequestType::Automated => self.evaluate_automated(now, record),
            RequestType::UserAppOpen => self.user_app_open.evaluate(&record.app_open_window, now),
            RequestType::UserRequest => {
                self.user_request.evaluate(&record.user_request_window, now)
            }
        }
    }

    /// Apply a successful `request_type` sync admitted at `now` to `record`.
    ///
    /// Must only be called after the sync completed successfully.
    pub fn commit_success(
        &self,
        request_type: RequestType,
        now: Timestamp,
        record: &mut UserRecord,
    ) {
        record.last_success_time = Some(match record.last_success_time {
            Some(previous) => previous.max(now),
            None => now,
        });

        match request_type {
            RequestType::Automated => {}
            RequestType::UserAppOpen => self.user_app_open.commit(&mut record.app_open_window, now),
            RequestType::UserRequest => {
                self.user_request.commit(&mut record.user_request_window, now)
            }
        }
    }

    fn evaluate_automated(&self, now: Timestamp, record: &UserRecord) -> Decision {
        match record.last_success_time {
            Some(last) => {
                let elapsed = now.duration_since(last);
                if elapsed < self.automated_interval {
                    Decision::Deny(DenyReason::AutomatedCooldown {
                        retry_after: self.automated_interval - elapsed,
                    })
                } else {
                    Decision::Admit
                }
            }
            None => Decision::Admit,
        }
    }
}
