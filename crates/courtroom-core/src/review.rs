//! Review records and the persistence collaborator.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CourtError;

/// Kind of a queued review mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewKind {
    /// Create a new review.
    Create,
    /// Replace the content of an existing review.
    Update,
    /// Delete an existing review.
    Delete,
}

impl ReviewKind {
    /// Past-tense action name carried by refresh notifications.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl fmt::Display for ReviewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// A persisted post-session review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review identifier assigned by the store.
    pub id: Uuid,
    /// The session the review belongs to.
    pub session_id: Uuid,
    /// The user who wrote it.
    pub author_id: Uuid,
    /// Review text.
    pub content: String,
    /// When the review was created.
    pub created_at: DateTime<Utc>,
}

/// External persistence service for reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Creates a review and returns the stored record.
    async fn create_review(
        &self,
        session_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Review, CourtError>;

    /// Replaces the content of `review_id`.
    async fn update_review(&self, review_id: Uuid, content: &str) -> Result<Review, CourtError>;

    /// Deletes `review_id`.
    async fn delete_review(&self, review_id: Uuid) -> Result<(), CourtError>;

    /// Lists the reviews of a session, most recent first.
    async fn list_reviews(&self, session_id: Uuid) -> Result<Vec<Review>, CourtError>;
}
