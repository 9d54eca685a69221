//! Courtroom participant roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A role a participant can be seated in, or that can own a script step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Sentinel for "no role assigned".
    #[default]
    None,
    /// Presiding judge.
    Judge,
    /// Prosecutor.
    Prosecutor,
    /// Defense attorney.
    Defense,
    /// Witness.
    Witness,
    /// Defendant.
    Defendant,
    /// Automated narrator; steps it owns advance on their own.
    AiNarration,
    /// Juror.
    Jury,
    /// Spectator with no speaking part.
    Audience,
}

impl Role {
    /// Every role, sentinel included, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::Judge,
        Self::Prosecutor,
        Self::Defense,
        Self::Witness,
        Self::Defendant,
        Self::AiNarration,
        Self::Jury,
        Self::Audience,
    ];

    /// Returns `true` for the automated narrator.
    #[must_use]
    pub const fn is_narrator(self) -> bool {
        matches!(self, Self::AiNarration)
    }

    /// Returns `true` if a participant in this role reads script lines.
    #[must_use]
    pub const fn is_player(self) -> bool {
        !matches!(self, Self::None | Self::Audience | Self::AiNarration)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Judge => "JUDGE",
            Self::Prosecutor => "PROSECUTOR",
            Self::Defense => "DEFENSE",
            Self::Witness => "WITNESS",
            Self::Defendant => "DEFENDANT",
            Self::AiNarration => "AI_NARRATION",
            Self::Jury => "JURY",
            Self::Audience => "AUDIENCE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
