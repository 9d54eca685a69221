//! Roster and session directory fakes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use courtroom_core::directory::{RoleDirectory, SessionDirectory, SessionRecord};
use courtroom_core::error::CourtError;
use courtroom_core::role::Role;
use uuid::Uuid;

/// An in-memory roster. Roles resolved remotely are remembered, so a second
/// lookup for the same user stays local.
#[derive(Debug, Default)]
pub struct StaticRoster {
    seats: Mutex<HashMap<Uuid, Role>>,
}

impl StaticRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats `user_id` in `role` and returns the roster, for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_member(self, user_id: Uuid, role: Role) -> Self {
        self.seat(user_id, role);
        self
    }

    /// Seats `user_id` in `role`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seat(&self, user_id: Uuid, role: Role) {
        self.seats.lock().unwrap().insert(user_id, role);
    }

    /// Removes `user_id` from the roster.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn unseat(&self, user_id: Uuid) {
        self.seats.lock().unwrap().remove(&user_id);
    }
}

impl RoleDirectory for StaticRoster {
    fn user_role(&self, user_id: Uuid) -> Role {
        self.seats
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or_default()
    }

    fn seated_count(&self, role: Role) -> usize {
        self.seats
            .lock()
            .unwrap()
            .values()
            .filter(|seated| **seated == role)
            .count()
    }

    fn remember_role(&self, user_id: Uuid, role: Role) {
        self.seat(user_id, role);
    }
}

/// A session directory that returns a fixed record and counts lookups.
#[derive(Debug)]
pub struct ScriptedSessionDirectory {
    record: SessionRecord,
    lookups: AtomicUsize,
}

impl ScriptedSessionDirectory {
    /// Creates a directory that answers every lookup with `record`.
    #[must_use]
    pub fn new(record: SessionRecord) -> Self {
        Self {
            record,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Creates a directory for a session without members.
    #[must_use]
    pub fn empty(session_id: Uuid) -> Self {
        Self::new(SessionRecord {
            session_id,
            members: Vec::new(),
        })
    }

    /// Number of `get_session` calls served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionDirectory for ScriptedSessionDirectory {
    async fn get_session(&self, _session_id: Uuid) -> Result<SessionRecord, CourtError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.record.clone())
    }
}

/// A session directory that always fails. Useful for testing role lookup
/// failures.
#[derive(Debug)]
pub struct FailingSessionDirectory;

#[async_trait]
impl SessionDirectory for FailingSessionDirectory {
    async fn get_session(&self, _session_id: Uuid) -> Result<SessionRecord, CourtError> {
        Err(CourtError::Infrastructure("connection refused".into()))
    }
}
