//! Domain events for the review context.

use courtroom_core::event::DomainEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event payload variants for the review context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewEventKind {
    /// The post-session review phase opened or closed.
    ReviewModeChanged {
        /// Whether review mode is on.
        enabled: bool,
    },
    /// The shared review cursor moved.
    ReviewIndexChanged {
        /// The review entry everybody is looking at.
        index: usize,
    },
    /// The phase was cleared for a new trial.
    PhaseReset,
}

/// Domain event envelope for the review context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEvent {
    /// The session the event belongs to.
    pub session_id: Uuid,
    /// Event-specific payload.
    pub kind: ReviewEventKind,
}

impl DomainEvent for ReviewEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ReviewEventKind::ReviewModeChanged { .. } => "review.mode_changed",
            ReviewEventKind::ReviewIndexChanged { .. } => "review.index_changed",
            ReviewEventKind::PhaseReset => "review.phase_reset",
        }
    }
}
