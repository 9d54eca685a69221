//! External collaborators consumed by the authority.

use std::sync::Arc;

use courtroom_core::clock::Clock;
use courtroom_core::directory::{RoleDirectory, SessionDirectory};
use courtroom_core::review::ReviewStore;
use courtroom_script::step::ScriptCatalog;

/// The collaborators a session authority works with.
#[derive(Clone)]
pub struct SessionServices {
    /// Local roster view.
    pub roster: Arc<dyn RoleDirectory>,
    /// Remote session data, used to resolve unknown requesters.
    pub sessions: Arc<dyn SessionDirectory>,
    /// Review persistence.
    pub reviews: Arc<dyn ReviewStore>,
    /// Script source.
    pub scripts: Arc<dyn ScriptCatalog>,
    /// Timestamps for queued review operations.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionServices").finish_non_exhaustive()
    }
}
