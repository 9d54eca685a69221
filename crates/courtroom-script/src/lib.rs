//! Courtroom Script — the read-only script a session walks through.
//!
//! Holds the step model, the pure permission evaluator that decides who may
//! advance a step, and the role labels and badges shown next to each line.
//! Everything here is deterministic so that observers and the authority
//! reach the same answers.

pub mod display;
pub mod permission;
pub mod step;
