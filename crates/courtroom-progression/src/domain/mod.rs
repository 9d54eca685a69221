//! Domain model for the progression context.

pub mod aggregates;
pub mod auto_mode;
pub mod commands;
pub mod events;
pub mod mirror;
