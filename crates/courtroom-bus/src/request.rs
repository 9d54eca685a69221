//! Participant → authority request channel.

use courtroom_core::error::CourtError;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::message::Request;

/// Creates the request channel of a session.
///
/// The channel is unbounded: the authority also sends requests to itself
/// (the narration follow-up advance) and must never block doing so.
#[must_use]
pub fn request_channel(session_id: Uuid) -> (RequestSender, RequestReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RequestSender { session_id, tx }, RequestReceiver { rx })
}

/// The sending half held by every participant.
#[derive(Debug, Clone)]
pub struct RequestSender {
    session_id: Uuid,
    tx: mpsc::UnboundedSender<Request>,
}

impl RequestSender {
    /// The session this sender belongs to.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Sends a request to the authority.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the authority has stopped.
    pub fn send(&self, request: Request) -> Result<(), CourtError> {
        self.tx
            .send(request)
            .map_err(|_| CourtError::ChannelClosed("session requests"))
    }

    /// `true` once the authority has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The receiving half, owned by the authority task.
#[derive(Debug)]
pub struct RequestReceiver {
    rx: mpsc::UnboundedReceiver<Request>,
}

impl RequestReceiver {
    /// Waits for the next request; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Request> {
        self.rx.recv().await
    }

    /// Stops accepting requests; queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requests_arrive_in_send_order() {
        // Arrange
        let (sender, mut receiver) = request_channel(Uuid::new_v4());
        let requester_id = Uuid::new_v4();

        // Act
        sender
            .send(Request::SetAutoMode {
                enabled: true,
                requester_id,
            })
            .unwrap();
        sender.send(Request::PrepareTrial { requester_id }).unwrap();

        // Assert
        assert_eq!(receiver.recv().await.unwrap().name(), "set_auto_mode");
        assert_eq!(receiver.recv().await.unwrap().name(), "prepare_trial");
    }

    #[tokio::test]
    async fn test_send_after_authority_stopped_fails() {
        let (sender, receiver) = request_channel(Uuid::new_v4());
        drop(receiver);

        let result = sender.send(Request::EndTrial {
            requester_id: Uuid::new_v4(),
        });

        assert!(matches!(result, Err(CourtError::ChannelClosed(_))));
        assert!(sender.is_closed());
    }
}
