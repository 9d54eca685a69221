//! Application services for the review context.

pub mod command_handlers;
pub mod drain;
pub mod query_handlers;
