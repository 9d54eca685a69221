//! Aggregate roots for the progression context.

use std::sync::Arc;

use courtroom_core::aggregate::AggregateRoot;
use courtroom_core::error::CourtError;
use courtroom_core::role::Role;
use courtroom_script::permission::advance_gate;
use courtroom_script::step::{Script, Step};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{ProgressionEvent, ProgressionEventKind};

/// The replicated progression record.
///
/// The authority mutates it through [`Progression`]; observers hold a copy
/// and feed it the same events, so [`ProgressionState::apply`] is the single
/// place where the fields change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Index of the current step.
    pub current_index: usize,
    /// Set once an advance was requested on the last step.
    pub is_completed: bool,
    /// Narration playback is in progress.
    pub is_playing_narration: bool,
    /// Auto-mode is reading the current step.
    pub is_auto_mode: bool,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            current_index: Script::FIRST_INDEX,
            is_completed: false,
            is_playing_narration: false,
            is_auto_mode: false,
        }
    }
}

impl ProgressionState {
    /// Applies a progression event.
    pub fn apply(&mut self, kind: &ProgressionEventKind) {
        match kind {
            ProgressionEventKind::IndexChanged { new_index } => {
                self.current_index = *new_index;
            }
            ProgressionEventKind::ScriptEnded => {
                self.current_index = Script::FIRST_INDEX;
                self.is_completed = true;
            }
            ProgressionEventKind::NarrationPlayingChanged { is_playing } => {
                self.is_playing_narration = *is_playing;
            }
            ProgressionEventKind::AutoModeChanged { enabled } => {
                self.is_auto_mode = *enabled;
            }
            ProgressionEventKind::TrialReset => *self = Self::default(),
        }
    }
}

/// Where an advance request stands before the requester's role matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStage {
    /// No script is loaded.
    NoScript,
    /// The script already ended; the request is stale.
    Completed,
    /// The current step is the last one; the request ends the script.
    AtLastStep,
    /// The request may move to the next step.
    Open,
}

/// Outcome of an advance request.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// The session moved to `new_index`.
    Advanced {
        /// The new current index.
        new_index: usize,
    },
    /// The script ended.
    Ended,
    /// Nothing changed; the reason is only logged.
    Ignored(CourtError),
}

/// The aggregate root for a session's progression.
#[derive(Debug)]
pub struct Progression {
    /// Session identifier.
    pub id: Uuid,
    script: Option<Arc<Script>>,
    state: ProgressionState,
    uncommitted_events: Vec<ProgressionEvent>,
}

impl Progression {
    /// Creates the progression for a session, optionally with its script.
    #[must_use]
    pub fn new(id: Uuid, script: Option<Arc<Script>>) -> Self {
        Self {
            id,
            script,
            state: ProgressionState::default(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Installs the script once the catalog delivered it.
    pub fn load_script(&mut self, script: Arc<Script>) {
        self.script = Some(script);
    }

    /// Returns the loaded script.
    #[must_use]
    pub fn script(&self) -> Option<&Arc<Script>> {
        self.script.as_ref()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ProgressionState {
        self.state
    }

    /// Returns the step at the current index.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.script
            .as_deref()
            .and_then(|script| script.step(self.state.current_index))
    }

    fn record(&mut self, kind: ProgressionEventKind) {
        let event = ProgressionEvent {
            session_id: self.id,
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Classifies an advance request before any role lookup happens.
    #[must_use]
    pub fn advance_stage(&self) -> AdvanceStage {
        let Some(script) = self.script.as_deref() else {
            return AdvanceStage::NoScript;
        };
        if self.state.is_completed {
            AdvanceStage::Completed
        } else if script.is_last(self.state.current_index) {
            AdvanceStage::AtLastStep
        } else {
            AdvanceStage::Open
        }
    }

    /// Ends the script, producing a `ScriptEnded` event.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::StaleRequest` unless the session is on its last
    /// step.
    pub fn end_script(&mut self) -> Result<(), CourtError> {
        if self.advance_stage() != AdvanceStage::AtLastStep {
            return Err(CourtError::StaleRequest(
                "script can only end from its last step".to_owned(),
            ));
        }
        self.record(ProgressionEventKind::ScriptEnded);
        Ok(())
    }

    /// Moves to the next step if the request passes the permission gate,
    /// producing an `IndexChanged` event.
    ///
    /// The gate is skipped when the request comes from the auto-mode timer,
    /// while auto-mode is active, or when the narrator owns the step.
    pub fn advance_step<F>(
        &mut self,
        requester_role: Role,
        from_auto_mode: bool,
        seated_count: F,
    ) -> AdvanceOutcome
    where
        F: Fn(Role) -> usize,
    {
        if self.advance_stage() != AdvanceStage::Open {
            return AdvanceOutcome::Ignored(CourtError::StaleRequest(format!(
                "step {} cannot advance",
                self.state.current_index
            )));
        }
        let Some(step) = self.current_step() else {
            return AdvanceOutcome::Ignored(CourtError::StaleRequest(format!(
                "no step at index {}",
                self.state.current_index
            )));
        };

        let bypass = from_auto_mode || self.state.is_auto_mode || step.role.is_narrator();
        if !bypass {
            let step_role = step.role;
            let gate = advance_gate(step, requester_role, seated_count);
            if let Some(refusal) = gate.refusal(requester_role, step_role) {
                return AdvanceOutcome::Ignored(refusal);
            }
        }

        let new_index = self.state.current_index + 1;
        self.record(ProgressionEventKind::IndexChanged { new_index });
        AdvanceOutcome::Advanced { new_index }
    }

    /// Sets the narration flag. Returns `false` if it already had that value.
    pub fn set_narration_playing(&mut self, is_playing: bool) -> bool {
        if self.state.is_playing_narration == is_playing {
            return false;
        }
        self.record(ProgressionEventKind::NarrationPlayingChanged { is_playing });
        true
    }

    /// Sets the auto-mode flag. Returns `false` if it already had that value.
    pub fn set_auto_mode(&mut self, enabled: bool) -> bool {
        if self.state.is_auto_mode == enabled {
            return false;
        }
        self.record(ProgressionEventKind::AutoModeChanged { enabled });
        true
    }

    /// Returns the role of the current step if nobody is seated to read it
    /// and auto-mode should take over.
    ///
    /// Narrator steps, the last step, a completed script and an already
    /// active auto-mode never qualify.
    pub fn auto_mode_candidate<F>(&self, seated_count: F) -> Option<Role>
    where
        F: Fn(Role) -> usize,
    {
        if self.state.is_auto_mode || self.advance_stage() != AdvanceStage::Open {
            return None;
        }
        let step = self.current_step()?;
        if step.role.is_narrator() || seated_count(step.role) > 0 {
            return None;
        }
        Some(step.role)
    }

    /// Rewinds the session for a new trial, producing a `TrialReset` event.
    pub fn reset_trial(&mut self) {
        self.record(ProgressionEventKind::TrialReset);
    }
}

impl AggregateRoot for Progression {
    type Event = ProgressionEvent;

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
