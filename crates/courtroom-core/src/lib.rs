//! Courtroom Core — shared domain abstractions.
//!
//! This crate defines the roles, error taxonomy, and collaborator traits
//! that every courtroom crate depends on. It contains no runtime code: the
//! membership service, review persistence, and narration playback are
//! supplied by the host through the traits in [`directory`], [`review`] and
//! [`narration`].

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod directory;
pub mod error;
pub mod event;
pub mod narration;
pub mod review;
pub mod role;
