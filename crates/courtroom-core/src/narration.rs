//! Narration playback collaborator.

use async_trait::async_trait;

use crate::error::CourtError;

/// Plays narrator lines (text-to-speech) on the local participant.
#[async_trait]
pub trait NarrationPlayer: Send + Sync {
    /// Plays `text` and resolves once playback has finished.
    async fn play(&self, text: &str) -> Result<(), CourtError>;
}
