//! Commands for the review context.

use courtroom_core::command::Command;
use courtroom_core::review::ReviewKind;
use uuid::Uuid;

/// Request to queue a review mutation on the authority.
#[derive(Debug, Clone)]
pub struct EnqueueReviewOperation {
    /// Kind of mutation.
    pub kind: ReviewKind,
    /// The session the review belongs to.
    pub session_id: Uuid,
    /// The user asking for the mutation.
    pub user_id: Uuid,
    /// Target review; absent for CREATE.
    pub review_id: Option<Uuid>,
    /// Review text for CREATE and UPDATE.
    pub payload: String,
}

impl Command for EnqueueReviewOperation {
    fn command_type(&self) -> &'static str {
        "review.enqueue_operation"
    }

    fn requester_id(&self) -> Uuid {
        self.user_id
    }
}

/// Request to open or close the review phase.
#[derive(Debug, Clone, Copy)]
pub struct SetReviewMode {
    /// The user asking for the change.
    pub user_id: Uuid,
    /// Desired review mode.
    pub enabled: bool,
}

impl Command for SetReviewMode {
    fn command_type(&self) -> &'static str {
        "review.set_mode"
    }

    fn requester_id(&self) -> Uuid {
        self.user_id
    }
}

/// Request to move the shared review cursor.
#[derive(Debug, Clone, Copy)]
pub struct SetReviewIndex {
    /// The user moving the cursor.
    pub user_id: Uuid,
    /// The new cursor position.
    pub index: usize,
}

impl Command for SetReviewIndex {
    fn command_type(&self) -> &'static str {
        "review.set_index"
    }

    fn requester_id(&self) -> Uuid {
        self.user_id
    }
}

/// Request to close the trial and open the review phase.
#[derive(Debug, Clone, Copy)]
pub struct EndTrial {
    /// The user ending the trial.
    pub requester_id: Uuid,
}

impl Command for EndTrial {
    fn command_type(&self) -> &'static str {
        "review.end_trial"
    }

    fn requester_id(&self) -> Uuid {
        self.requester_id
    }
}
