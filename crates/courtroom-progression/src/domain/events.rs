//! Domain events for the progression context.

use courtroom_core::event::DomainEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event payload variants for the progression context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionEventKind {
    /// The session moved to a new step.
    IndexChanged {
        /// The new current index.
        new_index: usize,
    },
    /// An advance was requested on the last step; the script is over.
    ScriptEnded,
    /// Narration playback started or stopped.
    NarrationPlayingChanged {
        /// Whether narration is playing.
        is_playing: bool,
    },
    /// Auto-mode was switched on or off.
    AutoModeChanged {
        /// Whether auto-mode is active.
        enabled: bool,
    },
    /// The session was rewound for a new trial.
    TrialReset,
}

/// Domain event envelope for the progression context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionEvent {
    /// The session the event belongs to.
    pub session_id: Uuid,
    /// Event-specific payload.
    pub kind: ProgressionEventKind,
}

impl DomainEvent for ProgressionEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ProgressionEventKind::IndexChanged { .. } => "progression.index_changed",
            ProgressionEventKind::ScriptEnded => "progression.script_ended",
            ProgressionEventKind::NarrationPlayingChanged { .. } => {
                "progression.narration_playing_changed"
            }
            ProgressionEventKind::AutoModeChanged { .. } => "progression.auto_mode_changed",
            ProgressionEventKind::TrialReset => "progression.trial_reset",
        }
    }
}
