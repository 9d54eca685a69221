//! Lookup of running sessions by id.

use std::collections::HashMap;

use courtroom_core::error::CourtError;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::authority::{RunningSession, SessionHandle, spawn_session};
use crate::config::SessionConfig;
use crate::services::SessionServices;

/// Running sessions keyed by session id.
#[derive(Debug)]
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: Mutex<HashMap<Uuid, RunningSession>>,
}

impl SessionRegistry {
    /// Creates an empty registry whose sessions use `config`.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The configuration sessions are started with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session's handle, starting it if it is not running yet.
    ///
    /// A session that is already running keeps its original authority.
    pub async fn open(
        &self,
        session_id: Uuid,
        authority_user_id: Uuid,
        services: SessionServices,
    ) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        if let Some(running) = sessions.get(&session_id) {
            return running.handle().clone();
        }
        let running = spawn_session(session_id, authority_user_id, services, self.config);
        let handle = running.handle().clone();
        sessions.insert(session_id, running);
        info!(%session_id, %authority_user_id, "session opened");
        handle
    }

    /// Returns the handle of a running session.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::SessionNotFound` if no session runs under
    /// `session_id`.
    pub async fn get(&self, session_id: Uuid) -> Result<SessionHandle, CourtError> {
        self.sessions
            .lock()
            .await
            .get(&session_id)
            .map(|running| running.handle().clone())
            .ok_or(CourtError::SessionNotFound(session_id))
    }

    /// Stops a session and removes it.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::SessionNotFound` if no session runs under
    /// `session_id`.
    pub async fn close(&self, session_id: Uuid) -> Result<(), CourtError> {
        let running = self
            .sessions
            .lock()
            .await
            .remove(&session_id)
            .ok_or(CourtError::SessionNotFound(session_id))?;
        running.shutdown().await;
        info!(%session_id, "session closed");
        Ok(())
    }

    /// Number of running sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// `true` when no session is running.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
