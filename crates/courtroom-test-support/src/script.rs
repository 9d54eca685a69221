//! Script catalog fakes.

use async_trait::async_trait;
use courtroom_core::error::CourtError;
use courtroom_core::role::Role;
use courtroom_script::step::{Script, ScriptCatalog};
use uuid::Uuid;

/// The reference script: Judge, narrator, Witness, Judge at indices 1..=4.
///
/// # Panics
///
/// Never in practice; the lines are a valid script.
#[must_use]
pub fn four_step_script() -> Script {
    Script::from_lines([
        (Role::Judge, "The court is now in session."),
        (Role::AiNarration, "The prosecution calls its first witness."),
        (Role::Witness, "I was at the harbour that night. I saw the boat leave!"),
        (Role::Judge, "We will adjourn until tomorrow."),
    ])
    .unwrap()
}

/// A catalog that serves the same script for every session.
#[derive(Debug, Clone)]
pub struct StaticScriptCatalog(pub Script);

#[async_trait]
impl ScriptCatalog for StaticScriptCatalog {
    async fn load_script(&self, _session_id: Uuid) -> Result<Script, CourtError> {
        Ok(self.0.clone())
    }
}

/// A catalog that has no script for any session.
#[derive(Debug)]
pub struct MissingScriptCatalog;

#[async_trait]
impl ScriptCatalog for MissingScriptCatalog {
    async fn load_script(&self, session_id: Uuid) -> Result<Script, CourtError> {
        Err(CourtError::ScriptUnavailable(format!(
            "no script for session {session_id}"
        )))
    }
}
