//! Script steps and the script catalog collaborator.

use async_trait::async_trait;
use courtroom_core::error::CourtError;
use courtroom_core::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of the courtroom script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Ordinal position within the script. Position 0 is reserved.
    pub position: usize,
    /// The role that owns (reads) this line.
    pub role: Role,
    /// The line itself.
    pub dialogue: String,
}

/// An ordered, immutable script.
///
/// Position 0 holds a reserved header step that is never presented; the
/// session starts at [`Script::FIRST_INDEX`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    /// Index of the first presented step.
    pub const FIRST_INDEX: usize = 1;

    /// Builds a script from steps that already carry their positions.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ScriptUnavailable` when there is no presentable
    /// step, and `CourtError::Validation` when positions are not exactly
    /// `0, 1, 2, ...`.
    pub fn new(steps: Vec<Step>) -> Result<Self, CourtError> {
        if steps.len() <= Self::FIRST_INDEX {
            return Err(CourtError::ScriptUnavailable(
                "script has no presentable steps".to_owned(),
            ));
        }
        if let Some((index, step)) = steps
            .iter()
            .enumerate()
            .find(|(index, step)| step.position != *index)
        {
            return Err(CourtError::Validation(format!(
                "step at index {index} declares position {}",
                step.position
            )));
        }
        Ok(Self { steps })
    }

    /// Builds a script from presented lines, inserting the reserved header.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ScriptUnavailable` when `lines` is empty.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, CourtError>
    where
        I: IntoIterator<Item = (Role, S)>,
        S: Into<String>,
    {
        let header = Step {
            position: 0,
            role: Role::None,
            dialogue: String::new(),
        };
        let steps = std::iter::once(header)
            .chain(
                lines
                    .into_iter()
                    .enumerate()
                    .map(|(i, (role, dialogue))| Step {
                        position: i + Self::FIRST_INDEX,
                        role,
                        dialogue: dialogue.into(),
                    }),
            )
            .collect();
        Self::new(steps)
    }

    /// Total number of steps, reserved header included.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the last step.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Returns `true` if `index` is at or past the last step.
    #[must_use]
    pub fn is_last(&self, index: usize) -> bool {
        index >= self.last_index()
    }

    /// Returns the step at `index`. The reserved header is never returned.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&Step> {
        if index < Self::FIRST_INDEX {
            return None;
        }
        self.steps.get(index)
    }

    /// Iterates over the presented steps.
    pub fn presented_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().skip(Self::FIRST_INDEX)
    }
}

/// External data service supplying session scripts.
#[async_trait]
pub trait ScriptCatalog: Send + Sync {
    /// Loads the script for `session_id`.
    async fn load_script(&self, session_id: Uuid) -> Result<Script, CourtError>;
}
