//! Domain model for the review context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod operation;
pub mod queue;
