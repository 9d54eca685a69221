//! Courtroom Progression — step progression bounded context.
//!
//! Responsible for the authoritative progression record (current step,
//! completion, narration and auto-mode flags), the advance request pipeline
//! with its permission gate, and the auto-mode countdown that advances steps
//! nobody is seated to read.

pub mod application;
pub mod domain;
