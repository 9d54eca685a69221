//! Shared test fakes and utilities for courtroom sessions.

mod clock;
mod directory;
mod narration;
mod review_store;
mod script;

pub use clock::FixedClock;
pub use directory::{FailingSessionDirectory, ScriptedSessionDirectory, StaticRoster};
pub use narration::{InstantNarration, RecordingNarrationPlayer};
pub use review_store::{FailingReviewStore, RecordingReviewStore, StoreCall};
pub use script::{MissingScriptCatalog, StaticScriptCatalog, four_step_script};
