//! Observer-side copy of the progression record.

use std::sync::Arc;

use courtroom_script::step::{Script, Step};

use super::aggregates::ProgressionState;
use super::events::ProgressionEventKind;

/// A read-only mirror of the authority's progression, fed by notifications.
///
/// Mirrors never decide anything on their own: every field changes only
/// through [`ProgressionMirror::apply`], with the same events the authority
/// recorded.
#[derive(Debug, Clone, Default)]
pub struct ProgressionMirror {
    script: Option<Arc<Script>>,
    state: ProgressionState,
}

impl ProgressionMirror {
    /// Creates a mirror over `script`, starting from the default state.
    #[must_use]
    pub fn new(script: Option<Arc<Script>>) -> Self {
        Self {
            script,
            state: ProgressionState::default(),
        }
    }

    /// Installs the script.
    pub fn load_script(&mut self, script: Arc<Script>) {
        self.script = Some(script);
    }

    /// Replaces the whole state, as when a join snapshot arrives.
    pub fn restore(&mut self, state: ProgressionState) {
        self.state = state;
    }

    /// Applies a confirmed event. Returns `true` if the state changed.
    pub fn apply(&mut self, kind: &ProgressionEventKind) -> bool {
        let before = self.state;
        self.state.apply(kind);
        before != self.state
    }

    /// The mirrored state.
    #[must_use]
    pub fn state(&self) -> ProgressionState {
        self.state
    }

    /// The mirrored script, if loaded.
    #[must_use]
    pub fn script(&self) -> Option<&Arc<Script>> {
        self.script.as_ref()
    }

    /// The step at the mirrored index.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.script
            .as_deref()
            .and_then(|script| script.step(self.state.current_index))
    }

    /// `true` if the mirrored index is the script's last step.
    #[must_use]
    pub fn is_on_last_step(&self) -> bool {
        self.script
            .as_deref()
            .is_some_and(|script| script.is_last(self.state.current_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtroom_core::role::Role;

    fn script() -> Arc<Script> {
        Arc::new(
            Script::from_lines([(Role::Judge, "Order."), (Role::Witness, "I object.")]).unwrap(),
        )
    }

    #[test]
    fn test_apply_reports_whether_state_changed() {
        let mut mirror = ProgressionMirror::new(Some(script()));

        assert!(mirror.apply(&ProgressionEventKind::IndexChanged { new_index: 2 }));
        assert!(!mirror.apply(&ProgressionEventKind::IndexChanged { new_index: 2 }));
        assert_eq!(mirror.current_step().unwrap().role, Role::Witness);
        assert!(mirror.is_on_last_step());
    }

    #[test]
    fn test_duplicate_script_ended_is_harmless() {
        let mut mirror = ProgressionMirror::new(Some(script()));
        mirror.apply(&ProgressionEventKind::IndexChanged { new_index: 2 });

        mirror.apply(&ProgressionEventKind::ScriptEnded);
        let changed = mirror.apply(&ProgressionEventKind::ScriptEnded);

        assert!(!changed);
        assert!(mirror.state().is_completed);
        assert_eq!(mirror.state().current_index, 1);
    }

    #[test]
    fn test_mirror_without_script_has_no_step() {
        let mirror = ProgressionMirror::default();

        assert!(mirror.current_step().is_none());
        assert!(!mirror.is_on_last_step());
    }
}
