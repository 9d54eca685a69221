//! Application services for the progression context.

pub mod auto_mode_timer;
pub mod command_handlers;
pub mod query_handlers;
