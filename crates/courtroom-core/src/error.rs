//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::role::Role;

/// Top-level error type shared by every courtroom crate.
///
/// The first five variants are the outcomes the authority absorbs locally:
/// they are logged and never travel back to the requester.
#[derive(Debug, Error)]
pub enum CourtError {
    /// An advance request came from someone who does not own the step.
    #[error("permission denied: {requester_role} cannot advance a step owned by {step_role}")]
    PermissionDenied {
        /// Role the requester holds.
        requester_role: Role,
        /// Role that owns the current step.
        step_role: Role,
    },

    /// Nobody is seated in the role that owns the current step.
    #[error("no participant is seated as {0}")]
    NoRoleHolder(Role),

    /// The request raced a state change that was already applied.
    #[error("stale request: {0}")]
    StaleRequest(String),

    /// The review persistence collaborator failed or returned nothing.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    /// The requester's role could not be resolved.
    #[error("role lookup failed for user {user_id}: {reason}")]
    RoleLookupFailure {
        /// The user whose role was looked up.
        user_id: Uuid,
        /// Why the lookup failed.
        reason: String,
    },

    /// A request carried invalid data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The script catalog could not supply a script.
    #[error("script unavailable: {0}")]
    ScriptUnavailable(String),

    /// No session is registered under the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The other end of a message channel is gone.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),

    /// An infrastructure error from a collaborator.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
