//! Query handlers for the review context.

use courtroom_core::error::CourtError;
use courtroom_core::review::{Review, ReviewStore};
use uuid::Uuid;

/// Loads the reviews of a session, most recent first.
///
/// # Errors
///
/// Returns the store's error if the listing fails.
pub async fn load_review_list(
    session_id: Uuid,
    store: &dyn ReviewStore,
) -> Result<Vec<Review>, CourtError> {
    let mut reviews = store.list_reviews(session_id).await?;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(reviews)
}
