//! Mock sync operation for testing.
//!
//! Allows scripting failures, holding syncs open, and recording calls for
//! verification.

use super::{SyncOperation, SyncOperationError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sync_gate_types::UserId;
use tokio::sync::Notify;

/// Mock sync operation for testing.
///
/// Succeeds by default. Clones share state, so a test can keep one handle
/// while the coordinator owns another.
#[derive(Debug, Default)]
pub struct MockSyncOperation {
    inner: Arc<Mutex<MockSyncInner>>,
}

#[derive(Debug, Default)]
struct MockSyncInner {
    calls: Vec<UserId>,
    fail_queue: VecDeque<String>,
    panic_next: bool,
    delay: Option<Duration>,
    holds: HashMap<UserId, Arc<Notify>>,
}

impl MockSyncOperation {
    /// Create a mock that always succeeds immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose syncs take `delay` to complete.
    pub fn with_delay(delay: Duration) -> Self {
        let mock = Self::default();
        mock.inner.lock().unwrap().delay = Some(delay);
        mock
    }

    /// Cause the next sync to fail with the given error.
    ///
    /// Calls queue up: `fail_next` twice fails the next two syncs.
    pub fn fail_next(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_queue.push_back(error.to_string());
    }

    /// Cause the next sync to panic.
    pub fn panic_next(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.panic_next = true;
    }

    /// Hold every sync for `user_id` open until [`release`](Self::release).
    pub fn hold(&self, user_id: &UserId) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .holds
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Notify::new()));
    }

    /// Let a held sync for `user_id` complete.
    pub fn release(&self, user_id: &UserId) {
        let gate = {
            let mut inner = self.inner.lock().unwrap();
            inner.holds.remove(user_id)
        };
        if let Some(gate) = gate {
            // Stores a permit if the sync has not started waiting yet.
            gate.notify_one();
        }
    }

    /// Users of every sync started so far, in call order.
    pub fn calls(&self) -> Vec<UserId> {
        let inner = self.inner.lock().unwrap();
        inner.calls.clone()
    }

    /// Number of syncs started so far.
    pub fn call_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.calls.len()
    }

    /// Number of syncs started for `user_id`.
    pub fn calls_for(&self, user_id: &UserId) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.calls.iter().filter(|u| *u == user_id).count()
    }
}

impl Clone for MockSyncOperation {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl SyncOperation for MockSyncOperation {
    async fn perform_sync(&self, user_id: &UserId) -> Result<(), SyncOperationError> {
        // Decide everything up front; the lock must not be held across await.
        let (failure, panic, delay, gate) = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(user_id.clone());
            let failure = inner.fail_queue.pop_front();
            let panic = std::mem::take(&mut inner.panic_next);
            let gate = inner.holds.get(user_id).cloned();
            (failure, panic, inner.delay, gate)
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if panic {
            panic!("scripted sync panic for {}", user_id);
        }

        match failure {
            Some(error) => Err(SyncOperationError::Failed(error)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_sync_succeeds_by_default() {
        let mock = MockSyncOperation::new();
        let user = UserId::from("a");

        mock.perform_sync(&user).await.unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls(), vec![user]);
    }

    #[tokio::test]
    async fn mock_sync_fails_queued_times() {
        let mock = MockSyncOperation::new();
        let user = UserId::from("a");
        mock.fail_next("first");
        mock.fail_next("second");

        let first = mock.perform_sync(&user).await.unwrap_err();
        let second = mock.perform_sync(&user).await.unwrap_err();
        assert_eq!(first.to_string(), "sync failed: first");
        assert_eq!(second.to_string(), "sync failed: second");
        assert!(mock.perform_sync(&user).await.is_ok());
    }

    #[tokio::test]
    async fn mock_sync_counts_per_user() {
        let mock = MockSyncOperation::new();
        let a = UserId::from("a");
        let b = UserId::from("b");

        mock.perform_sync(&a).await.unwrap();
        mock.perform_sync(&b).await.unwrap();
        mock.perform_sync(&a).await.unwrap();

        assert_eq!(mock.calls_for(&a), 2);
        assert_eq!(mock.calls_for(&b), 1);
    }

    #[tokio::test]
    async fn held_sync_waits_for_release() {
        let mock = MockSyncOperation::new();
        let user = UserId::from("a");
        mock.hold(&user);

        let handle = {
            let mock = mock.clone();
            let user = user.clone();
            tokio::spawn(async move { mock.perform_sync(&user).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        mock.release(&user);
        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("released sync should finish")
            .expect("task should not panic");
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn release_before_wait_does_not_block() {
        let mock = MockSyncOperation::new();
        let user = UserId::from("a");
        mock.hold(&user);
        mock.release(&user);

        tokio::time::timeout(Duration::from_secs(1), mock.perform_sync(&user))
            .await
            .expect("no hold should remain")
            .unwrap();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockSyncOperation::new();
        let clone = mock.clone();
        clone.fail_next("shared");

        assert!(mock.perform_sync(&UserId::from("a")).await.is_err());
        assert_eq!(clone.call_count(), 1);
    }
}
