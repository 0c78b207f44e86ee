//! Per-user rate-limit state.
//!
//! Records are plain data. Only [`Policies::commit_success`] mutates them,
//! and only after a sync has completed.
//!
//! [`Policies::commit_success`]: crate::Policies::commit_success

use serde::{Deserialize, Serialize};
use sync_gate_types::Timestamp;

/// Rolling count of successful syncs of one request type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowCounter {
    /// Start of the current window. `None` until the first success.
    pub window_start: Option<Timestamp>,
    /// Successful syncs since `window_start`.
    pub count: u32,
}

/// Rate-limit state for a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Time of the last successful sync of any type.
    ///
    /// Gates `Automated` requests only.
    pub last_success_time: Option<Timestamp>,
    /// Successes of `UserAppOpen` requests.
    pub app_open_window: WindowCounter,
    /// Successes of `UserRequest` requests.
    pub user_request_window: WindowCounter,
}

impl UserRecord {
    /// Create an empty record (no successes yet).
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty() {
        let record = UserRecord::new();
        assert_eq!(record.last_success_time, None);
        assert_eq!(record.app_open_window, WindowCounter::default());
        assert_eq!(record.user_request_window.window_start, None);
        assert_eq!(record.user_request_window.count, 0);
    }

    #[test]
    fn record_snapshot_serializes() {
        let mut record = UserRecord::new();
        record.last_success_time = Some(Timestamp::from_millis(42));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["last_success_time"], 42);
        assert_eq!(json["app_open_window"]["count"], 0);
    }
}
