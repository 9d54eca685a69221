//! Advance permission evaluation.
//!
//! The same function runs on the authority (to accept or drop a request) and
//! on observers (to enable the "next" control), so both sides always agree.

use courtroom_core::error::CourtError;
use courtroom_core::role::Role;

use crate::step::Step;

/// Result of evaluating who may advance a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceGate {
    /// The requester owns the step.
    Allowed,
    /// The narrator owns the step; it advances by itself.
    NarratorOwned,
    /// The requester has no role.
    NoRole,
    /// Nobody is seated in the owning role; the session should fall back to
    /// auto-mode.
    NoRoleHolder,
    /// The requester holds a different role.
    RoleMismatch,
}

impl AdvanceGate {
    /// Returns `true` only for [`AdvanceGate::Allowed`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Converts a refusal into the error the authority logs.
    #[must_use]
    pub fn refusal(self, requester_role: Role, step_role: Role) -> Option<CourtError> {
        match self {
            Self::Allowed => None,
            Self::NoRoleHolder => Some(CourtError::NoRoleHolder(step_role)),
            Self::NarratorOwned | Self::NoRole | Self::RoleMismatch => {
                Some(CourtError::PermissionDenied {
                    requester_role,
                    step_role,
                })
            }
        }
    }
}

/// Evaluates the advance rules in order and reports which one decided.
///
/// `seated_count` returns how many participants currently hold a role.
pub fn advance_gate<F>(step: &Step, requester_role: Role, seated_count: F) -> AdvanceGate
where
    F: Fn(Role) -> usize,
{
    if step.role.is_narrator() {
        return AdvanceGate::NarratorOwned;
    }
    if requester_role == Role::None {
        return AdvanceGate::NoRole;
    }
    if seated_count(step.role) == 0 {
        return AdvanceGate::NoRoleHolder;
    }
    if requester_role == step.role {
        AdvanceGate::Allowed
    } else {
        AdvanceGate::RoleMismatch
    }
}

/// Returns `true` if a participant in `requester_role` may advance `step`.
pub fn can_advance<F>(step: &Step, requester_role: Role, seated_count: F) -> bool
where
    F: Fn(Role) -> usize,
{
    advance_gate(step, requester_role, seated_count).is_allowed()
}
