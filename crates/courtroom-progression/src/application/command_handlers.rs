//! Command handlers for the progression context.
//!
//! Handlers run on the authority only, one at a time, against the session's
//! [`Progression`]. They never return errors to the requester: refusals are
//! classified as [`AdvanceOutcome::Ignored`] and logged. The events they
//! produce stay uncommitted on the aggregate; the caller takes and
//! broadcasts them.

use courtroom_core::aggregate::AggregateRoot;
use courtroom_core::command::Command;
use courtroom_core::directory::{RoleDirectory, SessionDirectory};
use courtroom_core::error::CourtError;
use courtroom_core::role::Role;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::{AdvanceOutcome, AdvanceStage, Progression};
use crate::domain::commands::{PrepareTrial, RequestAdvance, SetAutoMode, SetNarrationPlaying};

/// What a `SetAutoMode` request did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoModeTransition {
    /// Auto-mode was switched on; a countdown must start.
    Started,
    /// Auto-mode was switched off; the running countdown must stop.
    Stopped,
    /// The flag already had the requested value.
    Unchanged,
}

/// Resolves the role of `user_id`.
///
/// The local roster answers first. Unknown users are looked up in the
/// session directory and the answer is cached in the roster; a failed or
/// empty lookup yields [`Role::None`].
pub async fn resolve_requester_role(
    session_id: Uuid,
    user_id: Uuid,
    roster: &dyn RoleDirectory,
    sessions: &dyn SessionDirectory,
) -> Role {
    let local = roster.user_role(user_id);
    if local != Role::None {
        return local;
    }

    match sessions.get_session(session_id).await {
        Ok(record) => match record.role_of(user_id) {
            Some(role) => {
                roster.remember_role(user_id, role);
                role
            }
            None => {
                debug!(%user_id, "requester is not a member of the session");
                Role::None
            }
        },
        Err(e) => {
            let failure = CourtError::RoleLookupFailure {
                user_id,
                reason: e.to_string(),
            };
            warn!(error = %failure, "treating requester as having no role");
            Role::None
        }
    }
}

/// Handles the `RequestAdvance` command.
///
/// A request on the last step ends the script before the requester's role is
/// even looked up; otherwise the permission gate decides, unless the request
/// comes from auto-mode or the step belongs to the narrator.
#[instrument(skip_all, fields(session_id = %progression.id, requester_id = %command.requester_id, from_auto_mode = command.from_auto_mode))]
pub async fn handle_request_advance(
    command: &RequestAdvance,
    progression: &mut Progression,
    roster: &dyn RoleDirectory,
    sessions: &dyn SessionDirectory,
) -> AdvanceOutcome {
    match progression.advance_stage() {
        AdvanceStage::NoScript => {
            let reason = CourtError::ScriptUnavailable("no script loaded".to_owned());
            debug!(%reason, "advance ignored");
            return AdvanceOutcome::Ignored(reason);
        }
        AdvanceStage::Completed => {
            let reason = CourtError::StaleRequest("script already ended".to_owned());
            debug!(%reason, "advance ignored");
            return AdvanceOutcome::Ignored(reason);
        }
        AdvanceStage::AtLastStep => {
            return match progression.end_script() {
                Ok(()) => {
                    info!("script ended");
                    AdvanceOutcome::Ended
                }
                Err(reason) => AdvanceOutcome::Ignored(reason),
            };
        }
        AdvanceStage::Open => {}
    }

    let requester_role = if command.from_auto_mode {
        Role::None
    } else {
        resolve_requester_role(progression.id, command.requester_id, roster, sessions).await
    };

    let outcome = progression.advance_step(requester_role, command.from_auto_mode, |role| {
        roster.seated_count(role)
    });
    match &outcome {
        AdvanceOutcome::Advanced { new_index } => info!(new_index, %requester_role, "step advanced"),
        AdvanceOutcome::Ignored(CourtError::NoRoleHolder(role)) => {
            info!(%role, "advance refused, nobody holds the step's role");
        }
        AdvanceOutcome::Ignored(reason) => info!(%reason, "advance refused"),
        AdvanceOutcome::Ended => {}
    }
    outcome
}

/// Handles the `SetNarrationPlaying` command. Returns `true` if the flag
/// changed.
pub fn handle_set_narration_playing(
    command: &SetNarrationPlaying,
    progression: &mut Progression,
) -> bool {
    let changed = progression.set_narration_playing(command.is_playing);
    debug!(
        session_id = %progression.id,
        requester_id = %command.requester_id,
        is_playing = command.is_playing,
        changed,
        "narration flag"
    );
    changed
}

/// Handles the `SetAutoMode` command.
pub fn handle_set_auto_mode(command: &SetAutoMode, progression: &mut Progression) -> AutoModeTransition {
    if !progression.set_auto_mode(command.enabled) {
        debug!(
            session_id = %progression.id,
            enabled = command.enabled,
            "auto-mode already in requested state"
        );
        return AutoModeTransition::Unchanged;
    }
    info!(
        session_id = %progression.id,
        command = command.command_type(),
        requester_id = %command.requester_id(),
        enabled = command.enabled,
        "auto-mode changed"
    );
    if command.enabled {
        AutoModeTransition::Started
    } else {
        AutoModeTransition::Stopped
    }
}

/// Turns auto-mode on if nobody is seated to read the current step.
///
/// Returns the role that triggered it, so the caller can start the
/// countdown.
pub fn evaluate_auto_mode(progression: &mut Progression, roster: &dyn RoleDirectory) -> Option<Role> {
    let role = progression.auto_mode_candidate(|role| roster.seated_count(role))?;
    if !progression.set_auto_mode(true) {
        return None;
    }
    info!(session_id = %progression.id, %role, "nobody seated for step, entering auto-mode");
    Some(role)
}

/// Clears auto-mode after the countdown expired.
///
/// Returns `false` when auto-mode was already switched off, in which case
/// the expiry must not advance the step.
pub fn handle_auto_mode_expired(progression: &mut Progression) -> bool {
    progression.set_auto_mode(false)
}

/// Handles the `PrepareTrial` command: rewinds progression to the first step.
pub fn handle_prepare_trial(command: &PrepareTrial, progression: &mut Progression) {
    progression.reset_trial();
    info!(
        session_id = %progression.id,
        command = command.command_type(),
        requester_id = %command.requester_id(),
        pending_events = progression.uncommitted_events().len(),
        "trial prepared"
    );
}
