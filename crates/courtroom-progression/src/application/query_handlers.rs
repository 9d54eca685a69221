//! Query handlers for the progression context.
//!
//! Read-only views over the authority's aggregate and an observer's mirror.

use courtroom_core::directory::RoleDirectory;
use courtroom_core::role::Role;
use courtroom_script::permission::can_advance;
use courtroom_script::step::Step;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{Progression, ProgressionState};
use crate::domain::mirror::ProgressionMirror;

/// Read-only view of a session's progression.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// The replicated state.
    pub state: ProgressionState,
    /// The step at the current index.
    pub current_step: Option<Step>,
    /// Number of steps, including the reserved header.
    pub step_count: usize,
}

/// Builds the view of an authority's progression.
#[must_use]
pub fn get_progression_view(progression: &Progression) -> ProgressionView {
    ProgressionView {
        session_id: progression.id,
        state: progression.state(),
        current_step: progression.current_step().cloned(),
        step_count: progression.script().map_or(0, |script| script.step_count()),
    }
}

/// Whether the participant's "next" control is enabled.
///
/// Requires a running script that is not on its last step, no narration in
/// progress, auto-mode off, and the permission gate to accept `my_role`.
pub fn advance_affordance(mirror: &ProgressionMirror, my_role: Role, roster: &dyn RoleDirectory) -> bool {
    let state = mirror.state();
    if state.is_completed || state.is_playing_narration || state.is_auto_mode {
        return false;
    }
    if mirror.is_on_last_step() {
        return false;
    }
    mirror
        .current_step()
        .is_some_and(|step| can_advance(step, my_role, |role| roster.seated_count(role)))
}
