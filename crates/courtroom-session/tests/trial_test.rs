//! Integration tests for the trial lifecycle and the review phase.

mod common;

use std::time::Duration;

use common::{Observed, open_court};
use courtroom_core::review::ReviewKind;

#[tokio::test(start_paused = true)]
async fn test_end_trial_opens_review_mode_everywhere() {
    // Arrange
    let court = open_court(true);
    let (mut judge, judge_seen) = court.join(court.judge).await;
    let (mut witness, witness_seen) = court.join(court.witness).await;

    // Act
    judge.end_trial().unwrap();
    witness.wait_for(|v| v.review.is_review_mode).await.unwrap();
    witness.set_review_index(2).unwrap();
    let view = judge
        .wait_for(|v| v.review.current_review_index == 2)
        .await
        .unwrap();
    judge.end_trial().unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Assert
    assert!(view.review.is_review_mode);
    assert_eq!(witness_seen.count(&Observed::ReviewMode(true)), 1);
    assert_eq!(judge_seen.count(&Observed::ReviewMode(true)), 1);
    assert_eq!(witness_seen.count(&Observed::ReviewIndex(2)), 1);
}

#[tokio::test(start_paused = true)]
async fn test_prepare_trial_restarts_a_completed_script() {
    // Arrange
    let court = open_court(true);
    let (mut judge, _) = court.join(court.judge).await;
    let (mut witness, witness_seen) = court.join(court.witness).await;
    judge.wait_for(|v| v.can_advance).await.unwrap();
    judge.request_advance().unwrap();
    witness
        .wait_for(|v| v.progression.current_index == 3 && v.can_advance)
        .await
        .unwrap();
    witness.request_advance().unwrap();
    witness
        .wait_for(|v| v.progression.is_completed)
        .await
        .unwrap();
    judge.end_trial().unwrap();
    judge.wait_for(|v| v.review.is_review_mode).await.unwrap();

    // Act
    judge.prepare_trial().unwrap();
    let view = witness
        .wait_for(|v| !v.progression.is_completed && !v.review.is_review_mode)
        .await
        .unwrap();
    let judge_view = judge.wait_for(|v| v.can_advance).await.unwrap();

    // Assert
    assert_eq!(view.progression.current_index, 1);
    assert_eq!(view.review.current_review_index, 0);
    assert_eq!(judge_view.step.unwrap().index, 1);
    assert_eq!(witness_seen.count(&Observed::TrialReset), 1);
    assert_eq!(court.position().await, (1, false));

    judge.request_advance().unwrap();
    witness
        .wait_for(|v| v.progression.current_index >= 2)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_prepare_trial_drops_pending_reviews() {
    // Arrange
    let court = open_court(true);
    let (mut witness, _) = court.join(court.witness).await;
    witness
        .enqueue_review(ReviewKind::Create, None, "Never stored")
        .unwrap();

    // Act
    witness.prepare_trial().unwrap();
    witness
        .wait_for(|v| v.step.is_some())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    // Assert
    assert!(court.reviews.calls().is_empty());
    assert_eq!(witness.view().review_reloads, 0);
}
