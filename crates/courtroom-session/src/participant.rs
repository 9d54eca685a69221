//! The participant runtime.
//!
//! Every participant, the authority's own instance included, runs one task
//! that applies the authority's notifications to a local mirror and reports
//! what changed to a [`ParticipantObserver`]. Participants never decide on
//! shared state; they only send requests.
//!
//! Narration is played locally by every participant when a narrator step
//! loads. Only the authority's instance reports playback and asks for the
//! follow-up advance once it has finished.

use std::sync::Arc;
use std::time::Duration;

use courtroom_bus::{Notification, NotificationReceiver, Request, RequestSender, SessionSnapshot};
use courtroom_core::directory::RoleDirectory;
use courtroom_core::error::CourtError;
use courtroom_core::narration::NarrationPlayer;
use courtroom_core::review::{Review, ReviewKind, ReviewStore};
use courtroom_core::role::Role;
use courtroom_progression::application::query_handlers::advance_affordance;
use courtroom_progression::domain::aggregates::ProgressionState;
use courtroom_progression::domain::events::ProgressionEventKind;
use courtroom_progression::domain::mirror::ProgressionMirror;
use courtroom_review::application::query_handlers::load_review_list;
use courtroom_review::domain::aggregates::ReviewPhaseState;
use courtroom_review::domain::events::ReviewEventKind;
use courtroom_script::display::{Badge, active_badge, format_dialogue, role_label};
use courtroom_script::step::ScriptCatalog;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::authority::SessionHandle;
use crate::config::SessionConfig;

/// A step as presented to the participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    /// Index of the step.
    pub index: usize,
    /// Owning role.
    pub role: Role,
    /// Display label of the owning role.
    pub label: &'static str,
    /// Dialogue with a line break after each sentence.
    pub dialogue: String,
}

/// Presentation callbacks. Every method defaults to doing nothing.
pub trait ParticipantObserver: Send + Sync {
    /// A step was loaded.
    fn step_loaded(&self, _step: &StepView) {}
    /// The "next" control was enabled or disabled.
    fn affordance_changed(&self, _enabled: bool) {}
    /// The badge next to the current line changed.
    fn badge_changed(&self, _badge: Option<Badge>) {}
    /// Narration started or stopped somewhere in the session.
    fn narration_changed(&self, _is_playing: bool) {}
    /// The script ended.
    fn script_ended(&self) {}
    /// The authority is persisting a review operation.
    fn review_processing(&self, _kind: ReviewKind, _review_id: Option<Uuid>) {}
    /// The review list was reloaded.
    fn reviews_loaded(&self, _reviews: &[Review]) {}
    /// The review phase opened or closed.
    fn review_mode_changed(&self, _enabled: bool) {}
    /// The shared review cursor moved.
    fn review_index_changed(&self, _index: usize) {}
    /// The session was rewound for a new trial.
    fn trial_reset(&self) {}
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ParticipantObserver for NoopObserver {}

/// The collaborators a participant works with.
#[derive(Clone)]
pub struct ParticipantServices {
    /// Local roster view.
    pub roster: Arc<dyn RoleDirectory>,
    /// Review persistence, for list reloads.
    pub reviews: Arc<dyn ReviewStore>,
    /// Script source.
    pub scripts: Arc<dyn ScriptCatalog>,
    /// Local narration output.
    pub narration: Arc<dyn NarrationPlayer>,
    /// Presentation callbacks.
    pub observer: Arc<dyn ParticipantObserver>,
}

impl std::fmt::Debug for ParticipantServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticipantServices").finish_non_exhaustive()
    }
}

/// What the participant currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantView {
    /// Mirrored progression.
    pub progression: ProgressionState,
    /// Mirrored review phase.
    pub review: ReviewPhaseState,
    /// The current step, if any.
    pub step: Option<StepView>,
    /// Whether the "next" control is enabled.
    pub can_advance: bool,
    /// The badge next to the current line.
    pub badge: Option<Badge>,
    /// The last review list loaded.
    pub reviews: Vec<Review>,
    /// How many review lists were loaded.
    pub review_reloads: usize,
}

/// A joined participant.
#[derive(Debug)]
pub struct ParticipantHandle {
    user_id: Uuid,
    session_id: Uuid,
    requests: RequestSender,
    view: watch::Receiver<ParticipantView>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ParticipantHandle {
    /// The participant's user.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The latest view.
    #[must_use]
    pub fn view(&self) -> ParticipantView {
        self.view.borrow().clone()
    }

    /// Waits until the view satisfies `predicate` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` if the participant stopped first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Result<ParticipantView, CourtError>
    where
        F: FnMut(&ParticipantView) -> bool,
    {
        self.view
            .wait_for(predicate)
            .await
            .map(|view| view.clone())
            .map_err(|_| CourtError::ChannelClosed("participant view"))
    }

    /// Asks the authority to advance the current step.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn request_advance(&self) -> Result<(), CourtError> {
        self.requests.send(Request::RequestAdvance {
            requester_id: self.user_id,
            from_auto_mode: false,
        })
    }

    /// Asks the authority to switch auto-mode.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn set_auto_mode(&self, enabled: bool) -> Result<(), CourtError> {
        self.requests.send(Request::SetAutoMode {
            enabled,
            requester_id: self.user_id,
        })
    }

    /// Queues a review mutation on the authority.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn enqueue_review(
        &self,
        kind: ReviewKind,
        review_id: Option<Uuid>,
        payload: impl Into<String>,
    ) -> Result<(), CourtError> {
        self.requests.send(Request::EnqueueReviewOperation {
            kind,
            session_id: self.session_id,
            user_id: self.user_id,
            review_id,
            payload: payload.into(),
        })
    }

    /// Asks the authority to open or close the review phase.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn set_review_mode(&self, enabled: bool) -> Result<(), CourtError> {
        self.requests.send(Request::SetReviewMode {
            enabled,
            user_id: self.user_id,
        })
    }

    /// Asks the authority to move the shared review cursor.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn set_review_index(&self, index: usize) -> Result<(), CourtError> {
        self.requests.send(Request::SetReviewIndex {
            index,
            user_id: self.user_id,
        })
    }

    /// Asks the authority to close the trial and open reviews.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn end_trial(&self) -> Result<(), CourtError> {
        self.requests.send(Request::EndTrial {
            requester_id: self.user_id,
        })
    }

    /// Asks the authority to rewind the session for a new trial.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn prepare_trial(&self) -> Result<(), CourtError> {
        self.requests.send(Request::PrepareTrial {
            requester_id: self.user_id,
        })
    }

    /// Stops the participant task. A narration still playing finishes on
    /// its own but no longer reports back.
    pub async fn leave(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(user_id = %self.user_id, error = %e, "participant task failed");
        }
    }
}

/// Joins `user_id` to a running session and starts its participant task.
///
/// # Errors
///
/// Returns `CourtError::ScriptUnavailable` if the script cannot be loaded,
/// or `CourtError::ChannelClosed` if the session has stopped.
pub async fn join_session(
    session: &SessionHandle,
    user_id: Uuid,
    services: ParticipantServices,
    config: &SessionConfig,
) -> Result<ParticipantHandle, CourtError> {
    let script = services.scripts.load_script(session.session_id()).await?;
    let notifications = session.subscribe().await?;
    let (view_tx, view) = watch::channel(ParticipantView::default());
    let (narration_tx, narration_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let is_authority = session.authority_user_id() == user_id;

    let runtime = ParticipantRuntime {
        session: session.clone(),
        session_id: session.session_id(),
        user_id,
        is_authority,
        requests: session.requests(),
        services,
        narration_settle: config.narration_settle,
        mirror: ProgressionMirror::new(Some(Arc::new(script))),
        review: ReviewPhaseState::default(),
        reviews: Vec::new(),
        review_reloads: 0,
        can_advance: false,
        trial_epoch: 0,
        narration_tx,
        view_tx,
        cancel: cancel.clone(),
    };
    let span = info_span!("participant", session_id = %session.session_id(), %user_id, is_authority);
    let task = tokio::spawn(runtime.run(notifications, narration_rx).instrument(span));

    Ok(ParticipantHandle {
        user_id,
        session_id: session.session_id(),
        requests: session.requests(),
        view,
        cancel,
        task,
    })
}

/// Reported by a narration task once playback and the settle pause are over.
#[derive(Debug, Clone, Copy)]
struct NarrationFinished {
    index: usize,
    trial_epoch: u64,
}

struct ParticipantRuntime {
    session: SessionHandle,
    session_id: Uuid,
    user_id: Uuid,
    is_authority: bool,
    requests: RequestSender,
    services: ParticipantServices,
    narration_settle: Duration,
    mirror: ProgressionMirror,
    review: ReviewPhaseState,
    reviews: Vec<Review>,
    review_reloads: usize,
    can_advance: bool,
    trial_epoch: u64,
    narration_tx: mpsc::UnboundedSender<NarrationFinished>,
    view_tx: watch::Sender<ParticipantView>,
    cancel: CancellationToken,
}

impl ParticipantRuntime {
    async fn run(
        mut self,
        mut notifications: NotificationReceiver,
        mut narration: mpsc::UnboundedReceiver<NarrationFinished>,
    ) {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(finished) = narration.recv() => self.narration_finished(finished),
                notification = notifications.recv() => match notification {
                    Some(notification) => self.on_notification(notification).await,
                    None => match self.session.subscribe().await {
                        // Dropped for falling behind; the new channel opens
                        // with a snapshot, but a missed refresh is not in it.
                        Ok(fresh) => {
                            warn!("notification channel dropped, rejoining");
                            notifications = fresh;
                            self.reload_reviews().await;
                            self.publish();
                        }
                        Err(_) => break,
                    },
                },
            }
        }
        debug!("participant stopped");
    }

    fn send(&self, request: Request) {
        let name = request.name();
        if let Err(e) = self.requests.send(request) {
            warn!(request = name, error = %e, "request not sent");
        }
    }

    async fn on_notification(&mut self, notification: Notification) {
        let observer = Arc::clone(&self.services.observer);
        match notification {
            Notification::NotifyIndexChanged { new_index } => {
                self.mirror
                    .apply(&ProgressionEventKind::IndexChanged { new_index });
                self.load_step(true);
            }
            Notification::NotifyScriptEnded => {
                self.mirror.apply(&ProgressionEventKind::ScriptEnded);
                observer.script_ended();
            }
            Notification::NotifyNarrationPlaying { is_playing } => {
                if self
                    .mirror
                    .apply(&ProgressionEventKind::NarrationPlayingChanged { is_playing })
                {
                    observer.narration_changed(is_playing);
                }
            }
            Notification::NotifyAutoModeChanged { enabled } => {
                if self
                    .mirror
                    .apply(&ProgressionEventKind::AutoModeChanged { enabled })
                {
                    observer.badge_changed(self.badge());
                }
            }
            Notification::NotifyReviewProcessing { kind, review_id } => {
                observer.review_processing(kind, review_id);
            }
            Notification::NotifyReviewRefresh { session_id, .. } => {
                if session_id == self.session_id {
                    self.reload_reviews().await;
                }
            }
            Notification::NotifyReviewModeChanged { enabled } => {
                self.review
                    .apply(&ReviewEventKind::ReviewModeChanged { enabled });
                observer.review_mode_changed(enabled);
            }
            Notification::NotifyReviewIndexChanged { index } => {
                self.review
                    .apply(&ReviewEventKind::ReviewIndexChanged { index });
                observer.review_index_changed(index);
            }
            Notification::NotifyTrialReset => {
                self.trial_epoch += 1;
                self.mirror.apply(&ProgressionEventKind::TrialReset);
                self.review.apply(&ReviewEventKind::PhaseReset);
                self.reviews.clear();
                observer.trial_reset();
                self.load_step(true);
            }
            Notification::NotifySnapshot(snapshot) => self.restore(snapshot),
        }
        self.publish();
    }

    fn restore(&mut self, snapshot: SessionSnapshot) {
        self.mirror.restore(snapshot.progression);
        self.review = snapshot.review;
        // Joining mid-narration must not replay it.
        self.load_step(!snapshot.progression.is_playing_narration);
    }

    fn badge(&self) -> Option<Badge> {
        let is_auto_mode = self.mirror.state().is_auto_mode;
        self.mirror
            .current_step()
            .map(|step| active_badge(step.role, is_auto_mode))
    }

    fn step_view(&self) -> Option<StepView> {
        let index = self.mirror.state().current_index;
        self.mirror.current_step().map(|step| StepView {
            index,
            role: step.role,
            label: role_label(step.role),
            dialogue: format_dialogue(&step.dialogue).into_owned(),
        })
    }

    fn load_step(&mut self, narrate: bool) {
        let state = self.mirror.state();
        if state.is_completed {
            return;
        }
        let Some(step) = self.mirror.current_step().cloned() else {
            return;
        };

        let observer = Arc::clone(&self.services.observer);
        if let Some(view) = self.step_view() {
            observer.step_loaded(&view);
        }
        observer.badge_changed(self.badge());

        if self.mirror.is_on_last_step() {
            if self.is_authority {
                debug!(index = state.current_index, "last step loaded, ending script");
                self.send(Request::RequestAdvance {
                    requester_id: self.user_id,
                    from_auto_mode: false,
                });
            }
            return;
        }

        if narrate && step.role.is_narrator() {
            self.start_narration(state.current_index, step.dialogue);
        }
    }

    fn start_narration(&self, index: usize, text: String) {
        if self.is_authority {
            self.send(Request::SetNarrationPlaying {
                is_playing: true,
                requester_id: self.user_id,
            });
        }

        let player = Arc::clone(&self.services.narration);
        let finished = self.narration_tx.clone();
        let cancel = self.cancel.clone();
        let settle = self.narration_settle;
        let trial_epoch = self.trial_epoch;
        tokio::spawn(
            async move {
                if let Err(e) = player.play(&text).await {
                    warn!(index, error = %e, "narration playback failed");
                }
                tokio::time::sleep(settle).await;
                if cancel.is_cancelled() {
                    debug!(index, "narration finished after participant left");
                    return;
                }
                let _ = finished.send(NarrationFinished { index, trial_epoch });
            }
            .in_current_span(),
        );
    }

    fn narration_finished(&mut self, finished: NarrationFinished) {
        let state = self.mirror.state();
        if finished.trial_epoch != self.trial_epoch
            || finished.index != state.current_index
            || state.is_completed
        {
            debug!(index = finished.index, "stale narration completion ignored");
            return;
        }
        if !self.is_authority {
            return;
        }
        self.send(Request::SetNarrationPlaying {
            is_playing: false,
            requester_id: self.user_id,
        });
        self.send(Request::RequestAdvance {
            requester_id: self.user_id,
            from_auto_mode: false,
        });
    }

    async fn reload_reviews(&mut self) {
        match load_review_list(self.session_id, self.services.reviews.as_ref()).await {
            Ok(reviews) => {
                self.review_reloads += 1;
                self.services.observer.reviews_loaded(&reviews);
                self.reviews = reviews;
            }
            Err(e) => warn!(error = %e, "review list reload failed"),
        }
    }

    fn publish(&mut self) {
        let my_role = self.services.roster.user_role(self.user_id);
        let can_advance = advance_affordance(&self.mirror, my_role, self.services.roster.as_ref());
        if can_advance != self.can_advance {
            self.can_advance = can_advance;
            self.services.observer.affordance_changed(can_advance);
        }

        self.view_tx.send_replace(ParticipantView {
            progression: self.mirror.state(),
            review: self.review,
            step: self.step_view(),
            can_advance,
            badge: self.badge(),
            reviews: self.reviews.clone(),
            review_reloads: self.review_reloads,
        });
    }
}
