//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every request the authority validates.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;

    /// The user who sent the request.
    fn requester_id(&self) -> Uuid;
}
