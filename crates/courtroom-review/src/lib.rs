//! Courtroom Review — post-session review bounded context.
//!
//! Responsible for the replicated review phase (whether reviews are open and
//! which entry everybody is looking at) and for the authority's FIFO backlog
//! of create/update/delete operations, drained against the review store in
//! paced passes.

pub mod application;
pub mod domain;
