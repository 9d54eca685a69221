//! Review store fakes.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use courtroom_core::error::CourtError;
use courtroom_core::review::{Review, ReviewStore};
use uuid::Uuid;

/// One call received by a [`RecordingReviewStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `create_review`.
    Create {
        /// Session of the new review.
        session_id: Uuid,
        /// Author of the new review.
        author_id: Uuid,
        /// Review text.
        content: String,
    },
    /// `update_review`.
    Update {
        /// Target review.
        review_id: Uuid,
        /// New text.
        content: String,
    },
    /// `delete_review`.
    Delete {
        /// Target review.
        review_id: Uuid,
    },
    /// `list_reviews`.
    List {
        /// Listed session.
        session_id: Uuid,
    },
}

#[derive(Debug, Default)]
struct StoreState {
    calls: Vec<StoreCall>,
    reviews: Vec<Review>,
}

/// An in-memory review store that records every call in order.
///
/// Each created review is stamped one second after the previous one, so
/// listings have a deterministic most-recent-first order.
#[derive(Debug)]
pub struct RecordingReviewStore {
    epoch: DateTime<Utc>,
    state: Mutex<StoreState>,
}

impl Default for RecordingReviewStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingReviewStore {
    /// Creates an empty store.
    ///
    /// # Panics
    ///
    /// Never in practice; the epoch is a valid timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Seeds an existing review and returns it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed(&self, session_id: Uuid, author_id: Uuid, content: &str) -> Review {
        let mut state = self.state.lock().unwrap();
        let review = self.stamp(&state, session_id, author_id, content);
        state.reviews.push(review.clone());
        review
    }

    /// Returns every call received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns only the mutating calls, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, StoreCall::List { .. }))
            .collect()
    }

    /// Number of `list_reviews` calls received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn list_count(&self) -> usize {
        self.calls().len() - self.mutations().len()
    }

    fn stamp(&self, state: &StoreState, session_id: Uuid, author_id: Uuid, content: &str) -> Review {
        let offset = i64::try_from(state.reviews.len()).unwrap_or(i64::MAX);
        Review {
            id: Uuid::new_v4(),
            session_id,
            author_id,
            content: content.to_owned(),
            created_at: self.epoch + Duration::seconds(offset),
        }
    }
}

#[async_trait]
impl ReviewStore for RecordingReviewStore {
    async fn create_review(
        &self,
        session_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Review, CourtError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Create {
            session_id,
            author_id,
            content: content.to_owned(),
        });
        let review = self.stamp(&state, session_id, author_id, content);
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn update_review(&self, review_id: Uuid, content: &str) -> Result<Review, CourtError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Update {
            review_id,
            content: content.to_owned(),
        });
        let review = state
            .reviews
            .iter_mut()
            .find(|r| r.id == review_id)
            .ok_or_else(|| CourtError::PersistenceFailure(format!("review {review_id} not found")))?;
        content.clone_into(&mut review.content);
        Ok(review.clone())
    }

    async fn delete_review(&self, review_id: Uuid) -> Result<(), CourtError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Delete { review_id });
        let before = state.reviews.len();
        state.reviews.retain(|r| r.id != review_id);
        if state.reviews.len() == before {
            return Err(CourtError::PersistenceFailure(format!(
                "review {review_id} not found"
            )));
        }
        Ok(())
    }

    async fn list_reviews(&self, session_id: Uuid) -> Result<Vec<Review>, CourtError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::List { session_id });
        let mut reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

/// A review store whose every call fails. Useful for testing that failed
/// operations are still consumed.
#[derive(Debug)]
pub struct FailingReviewStore;

#[async_trait]
impl ReviewStore for FailingReviewStore {
    async fn create_review(
        &self,
        _session_id: Uuid,
        _author_id: Uuid,
        _content: &str,
    ) -> Result<Review, CourtError> {
        Err(CourtError::PersistenceFailure("connection refused".into()))
    }

    async fn update_review(&self, _review_id: Uuid, _content: &str) -> Result<Review, CourtError> {
        Err(CourtError::PersistenceFailure("connection refused".into()))
    }

    async fn delete_review(&self, _review_id: Uuid) -> Result<(), CourtError> {
        Err(CourtError::PersistenceFailure("connection refused".into()))
    }

    async fn list_reviews(&self, _session_id: Uuid) -> Result<Vec<Review>, CourtError> {
        Err(CourtError::PersistenceFailure("connection refused".into()))
    }
}
