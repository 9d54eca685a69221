//! Integration tests for step progression, narration and auto-mode.

mod common;

use std::time::Duration;

use common::{Observed, narration_lasting, open_court, settle};
use courtroom_bus::{Notification, NotificationReceiver, Request};
use courtroom_core::role::Role;
use courtroom_script::display::Badge;
use tokio::time::Instant;
use uuid::Uuid;

const NARRATOR_LINE: &str = "The prosecution calls its first witness.";

fn advance(requester_id: Uuid) -> Request {
    Request::RequestAdvance {
        requester_id,
        from_auto_mode: false,
    }
}

/// Receives until `wanted` arrives and returns every notification seen.
async fn recv_until(rx: &mut NotificationReceiver, wanted: &Notification) -> Vec<Notification> {
    let mut seen = Vec::new();
    while let Some(notification) = rx.recv().await {
        let done = notification == *wanted;
        seen.push(notification);
        if done {
            break;
        }
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn test_judge_advance_starts_narration_on_every_participant() {
    // Arrange
    let court = open_court(true);
    let judge_player = narration_lasting(30);
    let witness_player = narration_lasting(30);
    let (mut judge, _) = court.join_with(court.judge, judge_player.clone()).await;
    let (mut witness, witness_seen) = court
        .join_with(court.witness, witness_player.clone())
        .await;
    judge.wait_for(|v| v.can_advance).await.unwrap();

    // Act
    judge.request_advance().unwrap();
    let view = witness
        .wait_for(|v| v.progression.is_playing_narration)
        .await
        .unwrap();
    settle().await;

    // Assert
    assert_eq!(view.progression.current_index, 2);
    assert!(!view.can_advance);
    assert_eq!(judge_player.played(), [NARRATOR_LINE]);
    assert_eq!(witness_player.played(), [NARRATOR_LINE]);
    assert!(witness_seen.events().contains(&Observed::StepLoaded(2, Role::AiNarration)));
}

#[tokio::test(start_paused = true)]
async fn test_authority_narration_completion_advances_past_narrator_step() {
    // Arrange
    let court = open_court(true);
    let (mut judge, _) = court.join_with(court.judge, narration_lasting(3)).await;
    let (mut witness, _) = court.join_with(court.witness, narration_lasting(3)).await;
    judge.wait_for(|v| v.can_advance).await.unwrap();
    let started = Instant::now();

    // Act
    judge.request_advance().unwrap();
    let view = witness
        .wait_for(|v| v.progression.current_index == 3 && !v.progression.is_playing_narration)
        .await
        .unwrap();

    // Assert
    assert!(started.elapsed() >= Duration::from_millis(3500));
    assert_eq!(view.step.unwrap().role, Role::Witness);
    assert!(view.can_advance);
    assert!(!view.progression.is_auto_mode);
}

#[tokio::test(start_paused = true)]
async fn test_observer_narration_never_advances() {
    // Arrange
    let court = open_court(true);
    let witness_player = narration_lasting(1);
    let (mut witness, _) = court
        .join_with(court.witness, witness_player.clone())
        .await;

    // Act
    court.running.handle().send(advance(court.judge)).unwrap();
    witness
        .wait_for(|v| v.progression.current_index == 2)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Assert
    assert_eq!(witness_player.played(), [NARRATOR_LINE]);
    assert_eq!(court.position().await, (2, false));
}

#[tokio::test(start_paused = true)]
async fn test_unattended_witness_step_runs_auto_mode_then_ends() {
    // Arrange
    let court = open_court(false);
    let (mut judge, _) = court.join(court.judge).await;
    let (mut witness, witness_seen) = court.join(court.witness).await;
    judge.wait_for(|v| v.can_advance).await.unwrap();

    // Act
    judge.request_advance().unwrap();
    let counting = witness
        .wait_for(|v| v.progression.current_index == 3 && v.progression.is_auto_mode)
        .await
        .unwrap();
    let auto_mode_started = Instant::now();
    let ended = witness
        .wait_for(|v| v.progression.is_completed)
        .await
        .unwrap();

    // Assert
    assert_eq!(
        counting.badge,
        Some(Badge::AutoMode {
            triggered_by: Role::Witness
        })
    );
    assert!(!counting.can_advance);
    assert!(auto_mode_started.elapsed() >= Duration::from_secs(5));
    assert!(!ended.progression.is_auto_mode);
    assert_eq!(ended.progression.current_index, 1);
    assert_eq!(witness_seen.loaded_indices(), [1, 2, 3, 4]);
    assert_eq!(witness_seen.count(&Observed::ScriptEnded), 1);
}

#[tokio::test(start_paused = true)]
async fn test_advance_by_wrong_role_is_a_true_no_op() {
    // Arrange
    let court = open_court(true);
    let (witness, _) = court.join(court.witness).await;
    let stranger = Uuid::new_v4();

    // Act
    witness.request_advance().unwrap();
    court.running.handle().send(advance(stranger)).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Assert
    assert_eq!(court.position().await, (1, false));
    assert_eq!(witness.view().progression.current_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_auto_mode_enters_once_and_is_not_restarted() {
    // Arrange
    let court = open_court(false);
    let handle = court.running.handle().clone();
    let mut rx = handle.subscribe().await.unwrap();
    let enabled = Notification::NotifyAutoModeChanged { enabled: true };

    // Act
    handle.send(advance(court.judge)).unwrap();
    handle.send(advance(court.judge)).unwrap();
    recv_until(&mut rx, &enabled).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    handle
        .send(Request::SetAutoMode {
            enabled: true,
            requester_id: court.witness,
        })
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    // Assert
    assert_eq!(court.position().await, (4, false));
    let mut rest = Vec::new();
    while let Some(notification) = rx.try_recv() {
        rest.push(notification);
    }
    assert!(!rest.contains(&enabled));
    assert_eq!(
        rest,
        [
            Notification::NotifyAutoModeChanged { enabled: false },
            Notification::NotifyIndexChanged { new_index: 4 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_auto_mode_switched_off_mid_countdown_never_advances() {
    // Arrange
    let court = open_court(false);
    let handle = court.running.handle().clone();
    let mut rx = handle.subscribe().await.unwrap();
    handle.send(advance(court.judge)).unwrap();
    handle.send(advance(court.judge)).unwrap();
    recv_until(&mut rx, &Notification::NotifyAutoModeChanged { enabled: true }).await;

    // Act
    tokio::time::sleep(Duration::from_secs(2)).await;
    handle
        .send(Request::SetAutoMode {
            enabled: false,
            requester_id: court.judge,
        })
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Assert
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.progression.current_index, 3);
    assert!(!snapshot.progression.is_auto_mode);
}

#[tokio::test(start_paused = true)]
async fn test_last_step_ends_script_exactly_once() {
    // Arrange
    let court = open_court(true);
    let handle = court.running.handle().clone();
    let (mut witness, witness_seen) = court.join(court.witness).await;
    handle.send(advance(court.judge)).unwrap();
    handle.send(advance(court.witness)).unwrap();
    witness
        .wait_for(|v| v.progression.current_index == 3)
        .await
        .unwrap();
    witness.request_advance().unwrap();
    witness
        .wait_for(|v| v.progression.current_index == 4)
        .await
        .unwrap();

    // Act
    witness.request_advance().unwrap();
    handle.send(advance(court.judge)).unwrap();
    let view = witness
        .wait_for(|v| v.progression.is_completed)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Assert
    assert_eq!(view.progression.current_index, 1);
    assert!(!view.can_advance);
    assert_eq!(court.position().await, (1, true));
    assert_eq!(witness_seen.count(&Observed::ScriptEnded), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_joiner_catches_up_from_snapshot() {
    // Arrange
    let court = open_court(true);
    let handle = court.running.handle().clone();
    handle.send(advance(court.judge)).unwrap();
    handle.send(advance(court.judge)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let late_player = narration_lasting(1);

    // Act
    let (mut witness, witness_seen) = court.join_with(court.witness, late_player.clone()).await;
    let view = witness.wait_for(|v| v.step.is_some()).await.unwrap();

    // Assert
    assert_eq!(view.progression.current_index, 3);
    assert!(view.can_advance);
    assert_eq!(witness_seen.loaded_indices(), [3]);
    assert!(late_player.played().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_progression_view_describes_the_current_step() {
    // Arrange
    let court = open_court(true);
    let handle = court.running.handle().clone();
    handle.send(advance(court.judge)).unwrap();
    handle.send(advance(court.judge)).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Act
    let view = handle.progression_view().await.unwrap();

    // Assert
    assert_eq!(view.session_id, court.session_id);
    assert_eq!(view.step_count, 5);
    assert_eq!(view.state.current_index, 3);
    assert_eq!(view.current_step.unwrap().role, Role::Witness);
}
