//! Request and notification messages.

use courtroom_core::review::ReviewKind;
use courtroom_progression::domain::aggregates::ProgressionState;
use courtroom_progression::domain::events::ProgressionEventKind;
use courtroom_review::domain::aggregates::ReviewPhaseState;
use courtroom_review::domain::events::ReviewEventKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request from any participant to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Move to the next step.
    RequestAdvance {
        /// The user asking.
        requester_id: Uuid,
        /// Issued by the auto-mode timer.
        from_auto_mode: bool,
    },
    /// Report narration playback.
    SetNarrationPlaying {
        /// Whether narration is playing.
        is_playing: bool,
        /// The user reporting.
        requester_id: Uuid,
    },
    /// Switch auto-mode.
    SetAutoMode {
        /// Desired state.
        enabled: bool,
        /// The user asking.
        requester_id: Uuid,
    },
    /// Queue a review mutation.
    EnqueueReviewOperation {
        /// Kind of mutation.
        kind: ReviewKind,
        /// The session the review belongs to.
        session_id: Uuid,
        /// The user asking.
        user_id: Uuid,
        /// Target review; absent for CREATE.
        review_id: Option<Uuid>,
        /// Review text.
        payload: String,
    },
    /// Open or close the review phase.
    SetReviewMode {
        /// Desired state.
        enabled: bool,
        /// The user asking.
        user_id: Uuid,
    },
    /// Move the shared review cursor.
    SetReviewIndex {
        /// New cursor position.
        index: usize,
        /// The user asking.
        user_id: Uuid,
    },
    /// Close the trial and open reviews.
    EndTrial {
        /// The user asking.
        requester_id: Uuid,
    },
    /// Rewind the session for a new trial.
    PrepareTrial {
        /// The user asking.
        requester_id: Uuid,
    },
}

impl Request {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestAdvance { .. } => "request_advance",
            Self::SetNarrationPlaying { .. } => "set_narration_playing",
            Self::SetAutoMode { .. } => "set_auto_mode",
            Self::EnqueueReviewOperation { .. } => "enqueue_review_operation",
            Self::SetReviewMode { .. } => "set_review_mode",
            Self::SetReviewIndex { .. } => "set_review_index",
            Self::EndTrial { .. } => "end_trial",
            Self::PrepareTrial { .. } => "prepare_trial",
        }
    }
}

/// Everything an observer needs to catch up when it joins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Progression flags and index.
    pub progression: ProgressionState,
    /// Review phase flags and cursor.
    pub review: ReviewPhaseState,
}

/// A notification from the authority to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// The session moved to a new step.
    NotifyIndexChanged {
        /// The new current index.
        new_index: usize,
    },
    /// The script ended.
    NotifyScriptEnded,
    /// Narration started or stopped.
    NotifyNarrationPlaying {
        /// Whether narration is playing.
        is_playing: bool,
    },
    /// Auto-mode switched.
    NotifyAutoModeChanged {
        /// Whether auto-mode is active.
        enabled: bool,
    },
    /// A review operation is being sent to the store.
    NotifyReviewProcessing {
        /// Kind of mutation.
        kind: ReviewKind,
        /// Target review, if any.
        review_id: Option<Uuid>,
    },
    /// Review lists should be reloaded.
    NotifyReviewRefresh {
        /// The session whose reviews changed.
        session_id: Uuid,
        /// The user whose operation closed the pass.
        triggered_by: Uuid,
        /// Past-tense action of that operation.
        action: String,
    },
    /// The review phase opened or closed.
    NotifyReviewModeChanged {
        /// Whether review mode is on.
        enabled: bool,
    },
    /// The shared review cursor moved.
    NotifyReviewIndexChanged {
        /// New cursor position.
        index: usize,
    },
    /// The session was rewound for a new trial.
    NotifyTrialReset,
    /// Full replicated state, sent to one observer when it joins.
    NotifySnapshot(SessionSnapshot),
}

impl From<ProgressionEventKind> for Notification {
    fn from(kind: ProgressionEventKind) -> Self {
        match kind {
            ProgressionEventKind::IndexChanged { new_index } => Self::NotifyIndexChanged { new_index },
            ProgressionEventKind::ScriptEnded => Self::NotifyScriptEnded,
            ProgressionEventKind::NarrationPlayingChanged { is_playing } => {
                Self::NotifyNarrationPlaying { is_playing }
            }
            ProgressionEventKind::AutoModeChanged { enabled } => Self::NotifyAutoModeChanged { enabled },
            ProgressionEventKind::TrialReset => Self::NotifyTrialReset,
        }
    }
}

impl Notification {
    /// Maps a review phase event to its notification.
    ///
    /// A phase reset has none of its own: it always travels with a
    /// progression reset, whose `NotifyTrialReset` covers both.
    #[must_use]
    pub fn from_review_event(kind: ReviewEventKind) -> Option<Self> {
        match kind {
            ReviewEventKind::ReviewModeChanged { enabled } => {
                Some(Self::NotifyReviewModeChanged { enabled })
            }
            ReviewEventKind::ReviewIndexChanged { index } => {
                Some(Self::NotifyReviewIndexChanged { index })
            }
            ReviewEventKind::PhaseReset => None,
        }
    }
}
