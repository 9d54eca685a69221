//! Commands for the progression context.

use courtroom_core::command::Command;
use uuid::Uuid;

/// Request to move the session to the next step.
#[derive(Debug, Clone, Copy)]
pub struct RequestAdvance {
    /// The user asking for the advance.
    pub requester_id: Uuid,
    /// Set by the auto-mode timer; skips the permission gate.
    pub from_auto_mode: bool,
}

impl Command for RequestAdvance {
    fn command_type(&self) -> &'static str {
        "progression.request_advance"
    }

    fn requester_id(&self) -> Uuid {
        self.requester_id
    }
}

/// Request to set the narration-playing flag.
#[derive(Debug, Clone, Copy)]
pub struct SetNarrationPlaying {
    /// The user reporting playback.
    pub requester_id: Uuid,
    /// Whether narration is playing.
    pub is_playing: bool,
}

impl Command for SetNarrationPlaying {
    fn command_type(&self) -> &'static str {
        "progression.set_narration_playing"
    }

    fn requester_id(&self) -> Uuid {
        self.requester_id
    }
}

/// Request to switch auto-mode on or off.
#[derive(Debug, Clone, Copy)]
pub struct SetAutoMode {
    /// The user asking for the change.
    pub requester_id: Uuid,
    /// Desired auto-mode state.
    pub enabled: bool,
}

impl Command for SetAutoMode {
    fn command_type(&self) -> &'static str {
        "progression.set_auto_mode"
    }

    fn requester_id(&self) -> Uuid {
        self.requester_id
    }
}

/// Request to rewind the session for a new trial.
#[derive(Debug, Clone, Copy)]
pub struct PrepareTrial {
    /// The user asking for the reset.
    pub requester_id: Uuid,
}

impl Command for PrepareTrial {
    fn command_type(&self) -> &'static str {
        "progression.prepare_trial"
    }

    fn requester_id(&self) -> Uuid {
        self.requester_id
    }
}
