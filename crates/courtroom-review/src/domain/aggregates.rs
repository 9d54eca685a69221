//! Aggregate roots for the review context.

use courtroom_core::aggregate::AggregateRoot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{ReviewEvent, ReviewEventKind};

/// The replicated review phase record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPhaseState {
    /// The post-session review phase is open.
    pub is_review_mode: bool,
    /// The review entry participants are looking at together.
    pub current_review_index: usize,
}

impl ReviewPhaseState {
    /// Applies a review event.
    pub fn apply(&mut self, kind: &ReviewEventKind) {
        match kind {
            ReviewEventKind::ReviewModeChanged { enabled } => self.is_review_mode = *enabled,
            ReviewEventKind::ReviewIndexChanged { index } => self.current_review_index = *index,
            ReviewEventKind::PhaseReset => *self = Self::default(),
        }
    }
}

/// The aggregate root for a session's review phase.
#[derive(Debug)]
pub struct ReviewPhase {
    /// Session identifier.
    pub id: Uuid,
    state: ReviewPhaseState,
    uncommitted_events: Vec<ReviewEvent>,
}

impl ReviewPhase {
    /// Creates a closed review phase.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            state: ReviewPhaseState::default(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ReviewPhaseState {
        self.state
    }

    fn record(&mut self, kind: ReviewEventKind) {
        let event = ReviewEvent {
            session_id: self.id,
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Opens or closes the review phase. Returns `false` if it already had
    /// that value.
    pub fn set_review_mode(&mut self, enabled: bool) -> bool {
        if self.state.is_review_mode == enabled {
            return false;
        }
        self.record(ReviewEventKind::ReviewModeChanged { enabled });
        true
    }

    /// Moves the shared cursor. Returns `false` if it was already there.
    pub fn set_review_index(&mut self, index: usize) -> bool {
        if self.state.current_review_index == index {
            return false;
        }
        self.record(ReviewEventKind::ReviewIndexChanged { index });
        true
    }

    /// Clears the phase for a new trial.
    pub fn reset(&mut self) {
        self.record(ReviewEventKind::PhaseReset);
    }
}

impl AggregateRoot for ReviewPhase {
    type Event = ReviewEvent;

    fn session_id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, event: &Self::Event) {
        self.state.apply(&event.kind);
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
