//! Authority → observers notification fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use courtroom_core::error::CourtError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::message::Notification;

/// Identifies one observer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Fans notifications out to every subscribed observer.
///
/// Each observer gets its own bounded channel, so notifications reach every
/// observer in the order they were broadcast. Broadcasting never waits: an
/// observer whose channel is full has fallen behind and is dropped, the same
/// as one whose receiver is gone. A dropped observer reads what was already
/// queued, then sees its channel close and can subscribe again.
#[derive(Debug)]
pub struct Broadcaster {
    capacity: usize,
    next_id: AtomicU64,
    observers: Mutex<Vec<(ObserverId, mpsc::Sender<Notification>)>>,
}

impl Broadcaster {
    /// Creates a broadcaster whose observer channels hold `capacity`
    /// notifications.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_id: AtomicU64::new(0),
            observers: Mutex::new(Vec::new()),
        }
    }

    fn senders(&self) -> Vec<(ObserverId, mpsc::Sender<Notification>)> {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remove(&self, gone: &[ObserverId]) {
        if gone.is_empty() {
            return;
        }
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _)| !gone.contains(id));
        debug!(removed = gone.len(), "observer channels removed");
    }

    /// Opens a new observer channel.
    pub fn subscribe(&self) -> NotificationReceiver {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, tx));
        NotificationReceiver { id, rx }
    }

    /// Closes an observer's channel.
    pub fn unsubscribe(&self, id: ObserverId) {
        self.remove(&[id]);
    }

    /// Number of open observer channels.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `notification` to every observer and returns how many
    /// received it.
    pub fn broadcast(&self, notification: Notification) -> usize {
        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, tx) in self.senders() {
            match tx.try_send(notification.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(observer = id.0, capacity = self.capacity, "observer fell behind, dropping its channel");
                    gone.push(id);
                }
                Err(TrySendError::Closed(_)) => gone.push(id),
            }
        }
        self.remove(&gone);
        delivered
    }

    /// Delivers `notification` to a single observer.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` if that observer is gone or has
    /// fallen behind; it is dropped in both cases.
    pub fn send_to(&self, id: ObserverId, notification: Notification) -> Result<(), CourtError> {
        let tx = self
            .senders()
            .into_iter()
            .find_map(|(observer, tx)| (observer == id).then_some(tx))
            .ok_or(CourtError::ChannelClosed("observer notifications"))?;
        if tx.try_send(notification).is_err() {
            self.remove(&[id]);
            return Err(CourtError::ChannelClosed("observer notifications"));
        }
        Ok(())
    }
}

/// The receiving half held by an observer.
#[derive(Debug)]
pub struct NotificationReceiver {
    id: ObserverId,
    rx: mpsc::Receiver<Notification>,
}

impl NotificationReceiver {
    /// This channel's identifier.
    #[must_use]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Waits for the next notification; `None` once the authority is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Returns a notification if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_every_observer_sees_broadcast_order() {
        // Arrange
        let broadcaster = Broadcaster::new(8);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        // Act
        broadcaster.broadcast(Notification::NotifyIndexChanged { new_index: 2 });
        broadcaster.broadcast(Notification::NotifyScriptEnded);

        // Assert
        for receiver in [&mut first, &mut second] {
            assert_eq!(
                receiver.recv().await,
                Some(Notification::NotifyIndexChanged { new_index: 2 })
            );
            assert_eq!(receiver.recv().await, Some(Notification::NotifyScriptEnded));
        }
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_removed() {
        let broadcaster = Broadcaster::new(8);
        let _kept = broadcaster.subscribe();
        drop(broadcaster.subscribe());

        let delivered = broadcaster.broadcast(Notification::NotifyTrialReset);

        assert_eq!(delivered, 1);
        assert_eq!(broadcaster.observer_count(), 1);
    }

    #[tokio::test]
    async fn test_send_to_reaches_only_that_observer() {
        let broadcaster = Broadcaster::new(8);
        let mut target = broadcaster.subscribe();
        let mut other = broadcaster.subscribe();

        broadcaster
            .send_to(target.id(), Notification::NotifyReviewIndexChanged { index: 1 })
            .unwrap();

        assert_eq!(
            target.try_recv(),
            Some(Notification::NotifyReviewIndexChanged { index: 1 })
        );
        assert_eq!(other.try_recv(), None);
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_channel() {
        let broadcaster = Broadcaster::new(8);
        let mut receiver = broadcaster.subscribe();

        broadcaster.unsubscribe(receiver.id());

        assert_eq!(receiver.recv().await, None);
        assert!(matches!(
            broadcaster.send_to(receiver.id(), Notification::NotifyTrialReset),
            Err(CourtError::ChannelClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_observer_that_falls_behind_is_dropped_without_blocking() {
        // Arrange
        let broadcaster = Broadcaster::new(2);
        let mut stalled = broadcaster.subscribe();
        let mut reader = broadcaster.subscribe();

        // Act
        let mut delivered = Vec::new();
        for new_index in 2..=4 {
            delivered.push(broadcaster.broadcast(Notification::NotifyIndexChanged { new_index }));
            reader.recv().await;
        }

        // Assert
        assert_eq!(delivered, [2, 2, 1]);
        assert_eq!(broadcaster.observer_count(), 1);
        assert_eq!(
            stalled.recv().await,
            Some(Notification::NotifyIndexChanged { new_index: 2 })
        );
        assert_eq!(
            stalled.recv().await,
            Some(Notification::NotifyIndexChanged { new_index: 3 })
        );
        assert_eq!(stalled.recv().await, None);
    }
}
