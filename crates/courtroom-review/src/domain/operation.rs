//! Queued review operations.

use chrono::{DateTime, Utc};
use courtroom_core::error::CourtError;
use courtroom_core::review::ReviewKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A review mutation waiting in the authority's backlog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOperation {
    /// Kind of mutation.
    pub kind: ReviewKind,
    /// The session the review belongs to.
    pub session_id: Uuid,
    /// The user who asked for it.
    pub user_id: Uuid,
    /// Target review; absent for CREATE.
    pub review_id: Option<Uuid>,
    /// Review text for CREATE and UPDATE.
    pub payload: String,
    /// When the authority accepted it.
    pub enqueued_at: DateTime<Utc>,
}

impl ReviewOperation {
    /// Checks that the operation carries what its kind needs.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::Validation` for a CREATE or UPDATE with a blank
    /// payload, or an UPDATE or DELETE without a target review.
    pub fn validate(&self) -> Result<(), CourtError> {
        let needs_payload = matches!(self.kind, ReviewKind::Create | ReviewKind::Update);
        if needs_payload && self.payload.trim().is_empty() {
            return Err(CourtError::Validation(format!(
                "{} review operation has an empty payload",
                self.kind
            )));
        }
        let needs_target = matches!(self.kind, ReviewKind::Update | ReviewKind::Delete);
        if needs_target && self.review_id.is_none() {
            return Err(CourtError::Validation(format!(
                "{} review operation has no target review",
                self.kind
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn operation(kind: ReviewKind, review_id: Option<Uuid>, payload: &str) -> ReviewOperation {
        ReviewOperation {
            kind,
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            review_id,
            payload: payload.to_owned(),
            enqueued_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_requires_payload_but_no_target() {
        assert!(operation(ReviewKind::Create, None, "Well argued.").validate().is_ok());
        assert!(matches!(
            operation(ReviewKind::Create, None, "   ").validate(),
            Err(CourtError::Validation(_))
        ));
    }

    #[test]
    fn test_update_requires_payload_and_target() {
        let target = Some(Uuid::new_v4());

        assert!(operation(ReviewKind::Update, target, "Revised.").validate().is_ok());
        assert!(operation(ReviewKind::Update, None, "Revised.").validate().is_err());
        assert!(operation(ReviewKind::Update, target, "").validate().is_err());
    }

    #[test]
    fn test_delete_requires_only_target() {
        assert!(operation(ReviewKind::Delete, Some(Uuid::new_v4()), "").validate().is_ok());

        let error = operation(ReviewKind::Delete, None, "").validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "validation error: DELETE review operation has no target review"
        );
    }
}
