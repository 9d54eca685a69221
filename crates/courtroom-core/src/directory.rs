//! Membership collaborators.
//!
//! The roster of who sits in which role belongs to an external membership
//! service. The core reads it through [`RoleDirectory`] (a synchronous local
//! view) and falls back to [`SessionDirectory`] (a remote lookup) when a
//! requester is not known locally.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CourtError;
use crate::role::Role;

/// Local, synchronous view of the session roster.
pub trait RoleDirectory: Send + Sync {
    /// Returns the role of `user_id`, or [`Role::None`] when unknown.
    fn user_role(&self, user_id: Uuid) -> Role;

    /// Returns how many participants are currently seated in `role`.
    fn seated_count(&self, role: Role) -> usize;

    /// Caches a role resolved through a remote lookup.
    ///
    /// The default implementation discards it.
    fn remember_role(&self, _user_id: Uuid, _role: Role) {}
}

/// A member entry of a session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMember {
    /// The member's user identifier.
    pub user_id: Uuid,
    /// The role the member is seated in.
    pub role: Role,
}

/// Session data as returned by the remote session service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The session identifier.
    pub session_id: Uuid,
    /// Every member of the session.
    pub members: Vec<SessionMember>,
}

impl SessionRecord {
    /// Returns the role of `user_id` if they are a member.
    #[must_use]
    pub fn role_of(&self, user_id: Uuid) -> Option<Role> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }
}

/// Remote session data service.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Fetches the session record for `session_id`.
    async fn get_session(&self, session_id: Uuid) -> Result<SessionRecord, CourtError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_of_finds_member() {
        let judge = Uuid::new_v4();
        let record = SessionRecord {
            session_id: Uuid::new_v4(),
            members: vec![SessionMember {
                user_id: judge,
                role: Role::Judge,
            }],
        };

        assert_eq!(record.role_of(judge), Some(Role::Judge));
        assert_eq!(record.role_of(Uuid::new_v4()), None);
    }
}
