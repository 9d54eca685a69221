//! Command handlers for the review context.
//!
//! These run on the authority's session task. Enqueueing only appends to the
//! shared backlog; persistence happens later in the drain task.

use courtroom_core::clock::Clock;
use courtroom_core::command::Command;
use courtroom_core::error::CourtError;
use tracing::{debug, info, warn};

use crate::domain::aggregates::ReviewPhase;
use crate::domain::commands::{EndTrial, EnqueueReviewOperation, SetReviewIndex, SetReviewMode};
use crate::domain::operation::ReviewOperation;
use crate::domain::queue::ReviewQueue;

/// Handles the `EnqueueReviewOperation` command: stamps the operation and
/// appends it to the backlog.
///
/// # Errors
///
/// Returns `CourtError::Validation` if the operation names another session
/// or lacks the payload or target its kind needs; nothing is queued in that
/// case.
pub fn handle_enqueue_review_operation(
    command: EnqueueReviewOperation,
    queue: &ReviewQueue,
    clock: &dyn Clock,
) -> Result<usize, CourtError> {
    if command.session_id != queue.session_id() {
        let error = CourtError::Validation(format!(
            "review operation for session {} sent to session {}",
            command.session_id,
            queue.session_id()
        ));
        warn!(error = %error, user_id = %command.user_id, "review operation rejected");
        return Err(error);
    }
    let operation = ReviewOperation {
        kind: command.kind,
        session_id: command.session_id,
        user_id: command.user_id,
        review_id: command.review_id,
        payload: command.payload,
        enqueued_at: clock.now(),
    };
    if let Err(e) = operation.validate() {
        warn!(
            error = %e,
            kind = %operation.kind,
            user_id = %operation.user_id,
            "review operation rejected"
        );
        return Err(e);
    }

    let kind = operation.kind;
    let user_id = operation.user_id;
    let backlog = queue.push(operation);
    info!(%kind, %user_id, backlog, "review operation queued");
    Ok(backlog)
}

/// Handles the `SetReviewMode` command. Returns `true` if the phase changed.
pub fn handle_set_review_mode(command: &SetReviewMode, phase: &mut ReviewPhase) -> bool {
    let changed = phase.set_review_mode(command.enabled);
    debug!(
        session_id = %phase.id,
        command = command.command_type(),
        user_id = %command.requester_id(),
        enabled = command.enabled,
        changed,
        "review mode"
    );
    changed
}

/// Handles the `SetReviewIndex` command. Returns `true` if the cursor moved.
pub fn handle_set_review_index(command: &SetReviewIndex, phase: &mut ReviewPhase) -> bool {
    phase.set_review_index(command.index)
}

/// Handles the `EndTrial` command: opens the review phase.
pub fn handle_end_trial(command: &EndTrial, phase: &mut ReviewPhase) -> bool {
    let opened = phase.set_review_mode(true);
    info!(
        session_id = %phase.id,
        command = command.command_type(),
        requester_id = %command.requester_id(),
        opened,
        "trial ended"
    );
    opened
}

/// Clears the phase and drops the backlog for a new trial.
pub fn reset_review_phase(phase: &mut ReviewPhase, queue: &ReviewQueue) {
    phase.reset();
    let dropped = queue.clear();
    if dropped > 0 {
        warn!(session_id = %phase.id, dropped, "pending review operations dropped by trial reset");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use courtroom_core::aggregate::AggregateRoot;
    use courtroom_core::review::ReviewKind;
    use courtroom_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap())
    }

    fn session() -> Uuid {
        Uuid::from_u128(0x0c0f_fee0)
    }

    fn create(payload: &str) -> EnqueueReviewOperation {
        EnqueueReviewOperation {
            kind: ReviewKind::Create,
            session_id: session(),
            user_id: Uuid::new_v4(),
            review_id: None,
            payload: payload.to_owned(),
        }
    }

    #[test]
    fn test_enqueue_stamps_and_appends() {
        // Arrange
        let queue = ReviewQueue::new(session());
        let clock = clock();

        // Act
        let backlog = handle_enqueue_review_operation(create("Sharp cross-examination."), &queue, &clock)
            .unwrap();

        // Assert
        assert_eq!(backlog, 1);
        let queued = queue.pop().unwrap();
        assert_eq!(queued.enqueued_at, clock.0);
        assert_eq!(queued.payload, "Sharp cross-examination.");
    }

    #[test]
    fn test_enqueue_rejects_blank_create() {
        let queue = ReviewQueue::new(session());

        let result = handle_enqueue_review_operation(create(""), &queue, &clock());

        assert!(matches!(result, Err(CourtError::Validation(_))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_rejects_operation_for_another_session() {
        // Arrange
        let queue = ReviewQueue::new(session());
        let mut command = create("Convincing closing argument.");
        command.session_id = Uuid::new_v4();

        // Act
        let result = handle_enqueue_review_operation(command, &queue, &clock());

        // Assert
        assert!(matches!(result, Err(CourtError::Validation(_))));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_end_trial_opens_review_phase_once() {
        let mut phase = ReviewPhase::new(Uuid::new_v4());
        let command = EndTrial {
            requester_id: Uuid::new_v4(),
        };

        assert!(handle_end_trial(&command, &mut phase));
        assert!(!handle_end_trial(&command, &mut phase));
        assert!(phase.state().is_review_mode);
    }

    #[test]
    fn test_set_review_mode_and_index() {
        let mut phase = ReviewPhase::new(Uuid::new_v4());
        let user_id = Uuid::new_v4();

        assert!(handle_set_review_mode(&SetReviewMode { user_id, enabled: true }, &mut phase));
        assert!(handle_set_review_index(&SetReviewIndex { user_id, index: 1 }, &mut phase));
        assert!(!handle_set_review_index(&SetReviewIndex { user_id, index: 1 }, &mut phase));
        assert_eq!(phase.take_uncommitted_events().len(), 2);
    }

    #[test]
    fn test_reset_review_phase_drops_backlog() {
        let queue = ReviewQueue::new(session());
        let mut phase = ReviewPhase::new(Uuid::new_v4());
        handle_enqueue_review_operation(create("Good pacing."), &queue, &clock()).unwrap();

        reset_review_phase(&mut phase, &queue);

        assert!(queue.is_empty());
    }
}
