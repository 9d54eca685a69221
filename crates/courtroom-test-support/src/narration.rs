//! Narration player fakes.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use courtroom_core::error::CourtError;
use courtroom_core::narration::NarrationPlayer;

/// A narration player that finishes immediately.
#[derive(Debug)]
pub struct InstantNarration;

#[async_trait]
impl NarrationPlayer for InstantNarration {
    async fn play(&self, _text: &str) -> Result<(), CourtError> {
        Ok(())
    }
}

/// A narration player that records every line it plays and takes a fixed
/// amount of (tokio) time per line.
#[derive(Debug, Default)]
pub struct RecordingNarrationPlayer {
    duration: Duration,
    played: Mutex<Vec<String>>,
}

impl RecordingNarrationPlayer {
    /// Creates a player whose playback lasts `duration`.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            played: Mutex::new(Vec::new()),
        }
    }

    /// Returns the lines played so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrationPlayer for RecordingNarrationPlayer {
    async fn play(&self, text: &str) -> Result<(), CourtError> {
        self.played.lock().unwrap().push(text.to_owned());
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
