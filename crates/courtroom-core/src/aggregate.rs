//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for authority-owned aggregates whose mutations are expressed as
/// events.
///
/// The authority records events through command methods; every recorded
/// event is applied immediately and kept as uncommitted until the runtime
/// broadcasts it. Observers replay the same events on their mirrors, so
/// `apply` must be the only code path that mutates state.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the session this aggregate belongs to.
    fn session_id(&self) -> Uuid;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last broadcast.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Drains the uncommitted events for broadcasting.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
