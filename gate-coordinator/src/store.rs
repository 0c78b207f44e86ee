//! Per-user record store.
//!
//! One [`UserRecord`] per user id, each behind its own async mutex. The
//! mutex doubles as the per-user serialization slot: whoever holds it may
//! evaluate, sync and commit without interleaving with another request for
//! the same user. Different users never contend on each other's mutex.

use dashmap::DashMap;
use std::sync::Arc;
use sync_gate_core::UserRecord;
use sync_gate_types::UserId;
use tokio::sync::Mutex;

/// Shared slot holding one user's record.
pub type RecordSlot = Arc<Mutex<UserRecord>>;

/// Concurrent map of user records.
///
/// Records are created on first sight of a user id and live for the life of
/// the store.
#[derive(Debug, Default)]
pub struct UserStore {
    records: DashMap<UserId, RecordSlot>,
}

impl UserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slot for `user_id`, creating an empty record if needed.
    ///
    /// Creation goes through the map's entry API, so concurrent first
    /// requests for the same new user end up sharing one slot.
    pub fn slot(&self, user_id: &UserId) -> RecordSlot {
        if let Some(existing) = self.records.get(user_id) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .records
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(UserRecord::new())));
        Arc::clone(entry.value())
    }

    /// Copy of the record for `user_id`, if the user has been seen.
    ///
    /// Waits for any in-flight request for that user to finish first.
    pub async fn snapshot(&self, user_id: &UserId) -> Option<UserRecord> {
        // Clone the Arc out so no map shard lock is held across the await.
        let slot = self.records.get(user_id).map(|e| Arc::clone(e.value()))?;
        let record = slot.lock().await;
        Some(record.clone())
    }

    /// Number of users with a record.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no user has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_gate_types::Timestamp;

    #[test]
    fn slot_creates_record_lazily() {
        let store = UserStore::new();
        let user = UserId::from("a");
        assert!(store.is_empty());

        let _slot = store.slot(&user);
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn slot_returns_same_record_for_same_user() {
        let store = UserStore::new();
        let user = UserId::from("a");

        let first = store.slot(&user);
        let second = store.slot(&user);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn snapshot_reads_current_record() {
        let store = UserStore::new();
        let user = UserId::from("a");
        assert!(store.snapshot(&user).await.is_none());

        {
            let slot = store.slot(&user);
            let mut record = slot.lock().await;
            record.last_success_time = Some(Timestamp::from_secs(5));
        }

        let snapshot = store.snapshot(&user).await.unwrap();
        assert_eq!(snapshot.last_success_time, Some(Timestamp::from_secs(5)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_share_one_slot() {
        let store = Arc::new(UserStore::new());
        let user = UserId::from("fresh");

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = Arc::clone(&store);
                let user = user.clone();
                tokio::spawn(async move { store.slot(&user) })
            })
            .collect();

        let mut slots = Vec::new();
        for handle in handles {
            slots.push(handle.await.unwrap());
        }

        assert_eq!(store.len(), 1);
        assert!(slots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
