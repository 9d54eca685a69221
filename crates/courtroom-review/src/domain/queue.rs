//! The authority's review backlog.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use super::operation::ReviewOperation;

/// A FIFO of review operations shared between the session task (which
/// appends) and the drain task (which consumes).
///
/// A queue belongs to one session. Clones share the same backlog.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    session_id: Uuid,
    inner: Arc<Mutex<VecDeque<ReviewOperation>>>,
}

impl ReviewQueue {
    /// Creates an empty queue for `session_id`.
    #[must_use]
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            inner: Arc::default(),
        }
    }

    /// The session whose operations this queue holds.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<ReviewOperation>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an operation and returns the new backlog length.
    pub fn push(&self, operation: ReviewOperation) -> usize {
        let mut queue = self.lock();
        queue.push_back(operation);
        queue.len()
    }

    /// Removes and returns the oldest operation.
    pub fn pop(&self) -> Option<ReviewOperation> {
        self.lock().pop_front()
    }

    /// Number of waiting operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drops every waiting operation and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut queue = self.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use courtroom_core::review::ReviewKind;

    use super::*;

    fn delete(review_id: Uuid) -> ReviewOperation {
        ReviewOperation {
            kind: ReviewKind::Delete,
            session_id: Uuid::nil(),
            user_id: Uuid::nil(),
            review_id: Some(review_id),
            payload: String::new(),
            enqueued_at: Utc::now(),
        }
    }

    #[test]
    fn test_pop_returns_operations_in_push_order() {
        // Arrange
        let queue = ReviewQueue::new(Uuid::nil());
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

        // Act
        for id in ids {
            queue.push(delete(id));
        }
        let popped: Vec<_> = std::iter::from_fn(|| queue.pop())
            .filter_map(|op| op.review_id)
            .collect();

        // Assert
        assert_eq!(popped, ids);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_the_backlog() {
        let queue = ReviewQueue::new(Uuid::nil());
        let drain_side = queue.clone();

        assert_eq!(queue.push(delete(Uuid::new_v4())), 1);
        assert_eq!(drain_side.len(), 1);
        assert_eq!(drain_side.clear(), 1);
        assert!(queue.is_empty());
    }
}
