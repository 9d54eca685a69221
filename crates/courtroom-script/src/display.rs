//! Role labels, badges and dialogue formatting.

use std::borrow::Cow;
use std::sync::LazyLock;

use courtroom_core::role::Role;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

// The pattern is a literal, so compilation cannot fail.
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])\s+").expect("sentence break pattern is valid"));

/// Human-readable label for a role.
#[must_use]
pub const fn role_label(role: Role) -> &'static str {
    match role {
        Role::Judge => "Judge",
        Role::Prosecutor => "Prosecutor",
        Role::Defense => "Defense Attorney",
        Role::Witness => "Witness",
        Role::Defendant => "Defendant",
        Role::AiNarration => "AI Narration",
        Role::Jury => "Jury",
        Role::Audience => "Audience",
        Role::None => "Unknown",
    }
}

/// The badge shown next to the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    /// The badge of the role that owns the line.
    Role(Role),
    /// Auto-mode is reading the line on behalf of an empty seat.
    AutoMode {
        /// The role of the step that triggered auto-mode.
        triggered_by: Role,
    },
}

impl Badge {
    /// Label rendered on the badge.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Role(role) => role_label(role).to_owned(),
            Self::AutoMode { triggered_by } => format!("Auto ({})", role_label(triggered_by)),
        }
    }
}

/// Selects the badge for the current step.
#[must_use]
pub const fn active_badge(step_role: Role, is_auto_mode: bool) -> Badge {
    if is_auto_mode {
        Badge::AutoMode {
            triggered_by: step_role,
        }
    } else {
        Badge::Role(step_role)
    }
}

/// Breaks a line after every sentence-ending `.`, `!` or `?` that is
/// followed by more text.
#[must_use]
pub fn format_dialogue(dialogue: &str) -> Cow<'_, str> {
    // Only the whitespace is consumed, so a terminator right after a break
    // gets its own break too.
    SENTENCE_BREAK.replace_all(dialogue, |caps: &Captures<'_>| {
        let trailing = caps.get(0).is_some_and(|m| m.end() == dialogue.len());
        if trailing {
            caps[0].to_owned()
        } else {
            format!("{}\n", &caps[1])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_a_label() {
        for role in Role::ALL {
            assert!(!role_label(role).is_empty());
        }
        assert_eq!(role_label(Role::None), "Unknown");
    }

    #[test]
    fn test_auto_mode_badge_carries_triggering_role() {
        let badge = active_badge(Role::Witness, true);

        assert_eq!(
            badge,
            Badge::AutoMode {
                triggered_by: Role::Witness
            }
        );
        assert_eq!(badge.label(), "Auto (Witness)");
    }

    #[test]
    fn test_role_badge_outside_auto_mode() {
        assert_eq!(active_badge(Role::Judge, false), Badge::Role(Role::Judge));
    }

    #[test]
    fn test_format_dialogue_breaks_after_sentences() {
        assert_eq!(
            format_dialogue("Order! Order. Is the witness ready? Yes."),
            "Order!\nOrder.\nIs the witness ready?\nYes."
        );
    }

    #[test]
    fn test_format_dialogue_breaks_after_consecutive_terminators() {
        assert_eq!(format_dialogue("Wait. ! Go"), "Wait.\n!\nGo");
        assert_eq!(format_dialogue("Objection!  "), "Objection!  ");
    }

    #[test]
    fn test_format_dialogue_leaves_single_sentence_untouched() {
        assert!(matches!(
            format_dialogue("Please be seated."),
            Cow::Borrowed("Please be seated.")
        ));
    }

    #[test]
    fn test_badge_wire_format_names_the_triggering_role() {
        let badge = Badge::AutoMode {
            triggered_by: Role::Witness,
        };

        let json = serde_json::to_value(badge).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "AutoMode": { "triggered_by": "WITNESS" } })
        );
    }
}
