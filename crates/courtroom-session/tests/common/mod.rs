//! Shared test helpers for session integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use courtroom_core::narration::NarrationPlayer;
use courtroom_core::review::{Review, ReviewKind};
use courtroom_core::role::Role;
use courtroom_script::display::Badge;
use courtroom_session::{
    ParticipantHandle, ParticipantObserver, ParticipantServices, RunningSession, SessionConfig,
    SessionServices, StepView, join_session, spawn_session,
};
use courtroom_test_support::{
    FixedClock, InstantNarration, RecordingNarrationPlayer, RecordingReviewStore,
    ScriptedSessionDirectory, StaticRoster, StaticScriptCatalog, four_step_script,
};
use uuid::Uuid;

/// Something a participant reported to its observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    StepLoaded(usize, Role),
    Badge(Option<Badge>),
    Affordance(bool),
    Narration(bool),
    ScriptEnded,
    Processing(ReviewKind),
    ReviewsLoaded(usize),
    ReviewMode(bool),
    ReviewIndex(usize),
    TrialReset,
}

/// Observer that records every callback in order.
#[derive(Debug, Default)]
pub struct RecordingObserver(Mutex<Vec<Observed>>);

impl RecordingObserver {
    pub fn events(&self) -> Vec<Observed> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, wanted: &Observed) -> usize {
        self.events().iter().filter(|e| *e == wanted).count()
    }

    pub fn loaded_indices(&self) -> Vec<usize> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                Observed::StepLoaded(index, _) => Some(*index),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Observed) {
        self.0.lock().unwrap().push(event);
    }
}

impl ParticipantObserver for RecordingObserver {
    fn step_loaded(&self, step: &StepView) {
        self.push(Observed::StepLoaded(step.index, step.role));
    }

    fn affordance_changed(&self, enabled: bool) {
        self.push(Observed::Affordance(enabled));
    }

    fn badge_changed(&self, badge: Option<Badge>) {
        self.push(Observed::Badge(badge));
    }

    fn narration_changed(&self, is_playing: bool) {
        self.push(Observed::Narration(is_playing));
    }

    fn script_ended(&self) {
        self.push(Observed::ScriptEnded);
    }

    fn review_processing(&self, kind: ReviewKind, _review_id: Option<Uuid>) {
        self.push(Observed::Processing(kind));
    }

    fn reviews_loaded(&self, reviews: &[Review]) {
        self.push(Observed::ReviewsLoaded(reviews.len()));
    }

    fn review_mode_changed(&self, enabled: bool) {
        self.push(Observed::ReviewMode(enabled));
    }

    fn review_index_changed(&self, index: usize) {
        self.push(Observed::ReviewIndex(index));
    }

    fn trial_reset(&self) {
        self.push(Observed::TrialReset);
    }
}

/// A running courtroom with a judge (the authority's user) and a witness.
pub struct Court {
    pub session_id: Uuid,
    pub judge: Uuid,
    pub witness: Uuid,
    pub roster: Arc<StaticRoster>,
    pub reviews: Arc<RecordingReviewStore>,
    pub config: SessionConfig,
    pub running: RunningSession,
}

/// Opens the four-step courtroom. The judge is always seated; the witness
/// only when `witness_seated` is set.
pub fn open_court(witness_seated: bool) -> Court {
    let session_id = Uuid::new_v4();
    let judge = Uuid::new_v4();
    let witness = Uuid::new_v4();
    let roster = Arc::new(StaticRoster::new().with_member(judge, Role::Judge));
    if witness_seated {
        roster.seat(witness, Role::Witness);
    }
    let reviews = Arc::new(RecordingReviewStore::new());
    let config = SessionConfig::default();
    let services = SessionServices {
        roster: roster.clone(),
        sessions: Arc::new(ScriptedSessionDirectory::empty(session_id)),
        reviews: reviews.clone(),
        scripts: Arc::new(StaticScriptCatalog(four_step_script())),
        clock: Arc::new(FixedClock::default()),
    };
    let running = spawn_session(session_id, judge, services, config);
    Court {
        session_id,
        judge,
        witness,
        roster,
        reviews,
        config,
        running,
    }
}

impl Court {
    /// Joins `user_id` with the given narration player.
    pub async fn join_with(
        &self,
        user_id: Uuid,
        narration: Arc<dyn NarrationPlayer>,
    ) -> (ParticipantHandle, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let services = ParticipantServices {
            roster: self.roster.clone(),
            reviews: self.reviews.clone(),
            scripts: Arc::new(StaticScriptCatalog(four_step_script())),
            narration,
            observer: observer.clone(),
        };
        let handle = join_session(self.running.handle(), user_id, services, &self.config)
            .await
            .unwrap();
        (handle, observer)
    }

    /// Joins `user_id` with narration that finishes immediately.
    pub async fn join(&self, user_id: Uuid) -> (ParticipantHandle, Arc<RecordingObserver>) {
        self.join_with(user_id, Arc::new(InstantNarration)).await
    }

    /// Current index and completion flag on the authority.
    pub async fn position(&self) -> (usize, bool) {
        let snapshot = self.running.handle().snapshot().await.unwrap();
        (
            snapshot.progression.current_index,
            snapshot.progression.is_completed,
        )
    }
}

/// A narration player whose playback takes `secs` seconds.
pub fn narration_lasting(secs: u64) -> Arc<RecordingNarrationPlayer> {
    Arc::new(RecordingNarrationPlayer::new(Duration::from_secs(secs)))
}

/// Lets every task run without moving the paused clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
