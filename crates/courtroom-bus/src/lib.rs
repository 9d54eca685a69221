//! Courtroom Bus — the message surface between participants and the
//! session authority.
//!
//! Requests flow from any participant to the authority over one unbounded
//! ordered channel per session. Notifications flow from the authority to
//! each observer over a bounded ordered channel per observer. The types make
//! the direction explicit: participants hold a [`RequestSender`] and a
//! [`NotificationReceiver`]; only the authority holds the [`Broadcaster`].

pub mod broadcaster;
pub mod message;
pub mod request;

pub use broadcaster::{Broadcaster, NotificationReceiver, ObserverId};
pub use message::{Notification, Request, SessionSnapshot};
pub use request::{RequestReceiver, RequestSender, request_channel};
