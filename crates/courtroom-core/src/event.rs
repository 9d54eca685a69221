//! Events recorded by authority-owned aggregates.

/// A state change the authority broadcasts and observers replay.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Dotted name of the change, e.g. `progression.index_changed`.
    fn event_type(&self) -> &'static str;
}
