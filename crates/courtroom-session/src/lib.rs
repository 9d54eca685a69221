//! Courtroom Session — runtime wiring for one courtroom.
//!
//! A session runs one authority task that owns the progression record, the
//! review phase and the review backlog, plus a drain task that works the
//! backlog off. Participants join through a [`SessionHandle`] and run their
//! own task that mirrors the authority and reports to a
//! [`ParticipantObserver`]. Sessions are looked up in a [`SessionRegistry`].

pub mod authority;
pub mod config;
pub mod participant;
pub mod registry;
pub mod services;
pub mod telemetry;

pub use authority::{RunningSession, SessionHandle, spawn_session};
pub use config::{ConfigError, SessionConfig};
pub use participant::{
    NoopObserver, ParticipantHandle, ParticipantObserver, ParticipantServices, ParticipantView,
    StepView, join_session,
};
pub use registry::SessionRegistry;
pub use services::SessionServices;
pub use telemetry::{LogFormat, init_tracing};
