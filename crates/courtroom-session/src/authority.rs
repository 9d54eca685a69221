//! The session authority.
//!
//! One task per session owns every piece of mutable session state and takes
//! requests one at a time, so no two mutations ever interleave. A second
//! task drains the review backlog; it shares only the queue with the
//! authority task.

use std::sync::Arc;

use async_trait::async_trait;
use courtroom_bus::{
    Broadcaster, Notification, NotificationReceiver, Request, RequestReceiver, RequestSender,
    SessionSnapshot, request_channel,
};
use courtroom_core::aggregate::AggregateRoot;
use courtroom_core::error::CourtError;
use courtroom_core::event::DomainEvent;
use courtroom_core::review::ReviewKind;
use courtroom_progression::application::auto_mode_timer::run_auto_mode_countdown;
use courtroom_progression::application::command_handlers::{
    AutoModeTransition, evaluate_auto_mode, handle_auto_mode_expired, handle_prepare_trial,
    handle_request_advance, handle_set_auto_mode, handle_set_narration_playing,
};
use courtroom_progression::application::query_handlers::{ProgressionView, get_progression_view};
use courtroom_progression::domain::aggregates::{AdvanceOutcome, Progression};
use courtroom_progression::domain::auto_mode::{AutoModeCountdown, Tick};
use courtroom_progression::domain::commands::{
    PrepareTrial, RequestAdvance, SetAutoMode, SetNarrationPlaying,
};
use courtroom_review::application::command_handlers::{
    handle_end_trial, handle_enqueue_review_operation, handle_set_review_index,
    handle_set_review_mode, reset_review_phase,
};
use courtroom_review::application::drain::{DrainPacing, DrainSink, run_drain_loop};
use courtroom_review::domain::aggregates::ReviewPhase;
use courtroom_review::domain::commands::{
    EndTrial, EnqueueReviewOperation, SetReviewIndex, SetReviewMode,
};
use courtroom_review::domain::queue::ReviewQueue;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::services::SessionServices;

/// Messages the authority task receives besides participant requests.
#[derive(Debug)]
enum Control {
    Subscribe {
        reply: oneshot::Sender<NotificationReceiver>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    View {
        reply: oneshot::Sender<ProgressionView>,
    },
    AutoModeExpired {
        epoch: u64,
    },
}

/// A cheap, cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    authority_user_id: Uuid,
    requests: RequestSender,
    control: mpsc::UnboundedSender<Control>,
}

impl SessionHandle {
    /// The session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The user whose participant instance is the authority.
    #[must_use]
    pub fn authority_user_id(&self) -> Uuid {
        self.authority_user_id
    }

    /// A sender for requests to the authority.
    #[must_use]
    pub fn requests(&self) -> RequestSender {
        self.requests.clone()
    }

    /// Sends a request to the authority.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub fn send(&self, request: Request) -> Result<(), CourtError> {
        self.requests.send(request)
    }

    /// Opens a notification channel. Its first message is a
    /// `NotifySnapshot` of the current replicated state.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub async fn subscribe(&self) -> Result<NotificationReceiver, CourtError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::Subscribe { reply })
            .map_err(|_| CourtError::ChannelClosed("session control"))?;
        rx.await
            .map_err(|_| CourtError::ChannelClosed("session control"))
    }

    /// Returns the current replicated state.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, CourtError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::Snapshot { reply })
            .map_err(|_| CourtError::ChannelClosed("session control"))?;
        rx.await
            .map_err(|_| CourtError::ChannelClosed("session control"))
    }

    /// Returns the authority's progression together with the current step
    /// and the script length.
    ///
    /// # Errors
    ///
    /// Returns `CourtError::ChannelClosed` once the session has stopped.
    pub async fn progression_view(&self) -> Result<ProgressionView, CourtError> {
        let (reply, rx) = oneshot::channel();
        self.control
            .send(Control::View { reply })
            .map_err(|_| CourtError::ChannelClosed("session control"))?;
        rx.await
            .map_err(|_| CourtError::ChannelClosed("session control"))
    }

    /// `true` once the session has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.control.is_closed()
    }
}

/// A running session: its handle plus the tasks behind it.
#[derive(Debug)]
pub struct RunningSession {
    handle: SessionHandle,
    cancel: CancellationToken,
    authority: JoinHandle<()>,
    drain: JoinHandle<()>,
}

impl RunningSession {
    /// The session's handle.
    #[must_use]
    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Stops both tasks and waits for them. Review operations still queued
    /// are dropped.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for (name, task) in [("authority", self.authority), ("review drain", self.drain)] {
            if let Err(e) = task.await {
                warn!(session_id = %self.handle.session_id, task = name, error = %e, "session task failed");
            }
        }
    }
}

/// Starts the authority and review drain tasks of a session.
///
/// `authority_user_id` identifies the participant instance that acts for
/// the authority (its own follow-up and auto-mode advances carry this id).
#[must_use]
pub fn spawn_session(
    session_id: Uuid,
    authority_user_id: Uuid,
    services: SessionServices,
    config: SessionConfig,
) -> RunningSession {
    let (requests, request_rx) = request_channel(session_id);
    let (control, control_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let broadcaster = Arc::new(Broadcaster::new(config.channel_capacity));
    let queue = ReviewQueue::new(session_id);
    let span = info_span!("session", %session_id);

    let drain = {
        let reviews = Arc::clone(&services.reviews);
        let sink = BroadcastSink(Arc::clone(&broadcaster));
        let queue = queue.clone();
        let cancel = cancel.child_token();
        let pacing = DrainPacing {
            per_operation: config.review_pacing,
            settle: config.review_refresh_settle,
        };
        tokio::spawn(
            async move {
                run_drain_loop(
                    queue,
                    reviews.as_ref(),
                    &sink,
                    config.review_drain_interval,
                    pacing,
                    cancel,
                )
                .await;
            }
            .instrument(span.clone()),
        )
    };

    let authority = Authority {
        session_id,
        authority_user_id,
        services,
        config,
        progression: Progression::new(session_id, None),
        phase: ReviewPhase::new(session_id),
        queue,
        broadcaster,
        control: control.clone(),
        countdown: None,
        countdown_epoch: 0,
        cancel: cancel.clone(),
    };
    let authority = tokio::spawn(authority.run(request_rx, control_rx).instrument(span));

    RunningSession {
        handle: SessionHandle {
            session_id,
            authority_user_id,
            requests,
            control,
        },
        cancel,
        authority,
        drain,
    }
}

/// Publishes drain announcements to every observer.
struct BroadcastSink(Arc<Broadcaster>);

#[async_trait]
impl DrainSink for BroadcastSink {
    async fn processing(&self, kind: ReviewKind, review_id: Option<Uuid>) {
        self.0
            .broadcast(Notification::NotifyReviewProcessing { kind, review_id });
    }

    async fn refresh(&self, session_id: Uuid, triggered_by: Uuid, action: &'static str) {
        self.0
            .broadcast(Notification::NotifyReviewRefresh {
                session_id,
                triggered_by,
                action: action.to_owned(),
            });
    }
}

struct Countdown {
    epoch: u64,
    cancel: CancellationToken,
}

struct Authority {
    session_id: Uuid,
    authority_user_id: Uuid,
    services: SessionServices,
    config: SessionConfig,
    progression: Progression,
    phase: ReviewPhase,
    queue: ReviewQueue,
    broadcaster: Arc<Broadcaster>,
    control: mpsc::UnboundedSender<Control>,
    countdown: Option<Countdown>,
    countdown_epoch: u64,
    cancel: CancellationToken,
}

impl Authority {
    async fn run(
        mut self,
        mut requests: RequestReceiver,
        mut control: mpsc::UnboundedReceiver<Control>,
    ) {
        match self.services.scripts.load_script(self.session_id).await {
            Ok(script) => {
                info!(steps = script.step_count(), "script loaded");
                self.progression.load_script(Arc::new(script));
                self.enter_auto_mode_if_unattended();
            }
            Err(e) => warn!(error = %e, "no script; advance requests will be ignored"),
        }

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Some(message) = control.recv() => self.handle_control(message).await,
                request = requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
            }
        }

        self.stop_countdown();
        requests.close();
        info!(pending_reviews = self.queue.len(), "session authority stopped");
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            progression: self.progression.state(),
            review: self.phase.state(),
        }
    }

    async fn handle_control(&mut self, message: Control) {
        match message {
            Control::Subscribe { reply } => {
                let receiver = self.broadcaster.subscribe();
                let id = receiver.id();
                if let Err(e) = self
                    .broadcaster
                    .send_to(id, Notification::NotifySnapshot(self.snapshot()))
                {
                    warn!(error = %e, "join snapshot not delivered");
                }
                if reply.send(receiver).is_err() {
                    self.broadcaster.unsubscribe(id);
                }
                debug!(observers = self.broadcaster.observer_count(), "observer joined");
            }
            Control::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Control::View { reply } => {
                let _ = reply.send(get_progression_view(&self.progression));
            }
            Control::AutoModeExpired { epoch } => self.auto_mode_expired(epoch).await,
        }
    }

    async fn handle_request(&mut self, request: Request) {
        debug!(request = request.name(), "request received");
        match request {
            Request::RequestAdvance {
                requester_id,
                from_auto_mode,
            } => self.advance(requester_id, from_auto_mode).await,
            Request::SetNarrationPlaying {
                is_playing,
                requester_id,
            } => {
                let command = SetNarrationPlaying {
                    requester_id,
                    is_playing,
                };
                if handle_set_narration_playing(&command, &mut self.progression) {
                    self.publish_progression();
                }
            }
            Request::SetAutoMode {
                enabled,
                requester_id,
            } => {
                let command = SetAutoMode {
                    requester_id,
                    enabled,
                };
                match handle_set_auto_mode(&command, &mut self.progression) {
                    AutoModeTransition::Started => {
                        self.publish_progression();
                        self.start_countdown();
                    }
                    AutoModeTransition::Stopped => {
                        self.stop_countdown();
                        self.publish_progression();
                    }
                    AutoModeTransition::Unchanged => {}
                }
            }
            Request::EnqueueReviewOperation {
                kind,
                session_id,
                user_id,
                review_id,
                payload,
            } => {
                let command = EnqueueReviewOperation {
                    kind,
                    session_id,
                    user_id,
                    review_id,
                    payload,
                };
                // Rejections are logged by the handler.
                let _ = handle_enqueue_review_operation(
                    command,
                    &self.queue,
                    self.services.clock.as_ref(),
                );
            }
            Request::SetReviewMode { enabled, user_id } => {
                let command = SetReviewMode { user_id, enabled };
                if handle_set_review_mode(&command, &mut self.phase) {
                    self.publish_review_phase();
                }
            }
            Request::SetReviewIndex { index, user_id } => {
                let command = SetReviewIndex { user_id, index };
                if handle_set_review_index(&command, &mut self.phase) {
                    self.publish_review_phase();
                }
            }
            Request::EndTrial { requester_id } => {
                if handle_end_trial(&EndTrial { requester_id }, &mut self.phase) {
                    self.publish_review_phase();
                }
            }
            Request::PrepareTrial { requester_id } => {
                self.stop_countdown();
                handle_prepare_trial(&PrepareTrial { requester_id }, &mut self.progression);
                reset_review_phase(&mut self.phase, &self.queue);
                self.publish_review_phase();
                self.publish_progression();
                self.enter_auto_mode_if_unattended();
            }
        }
    }

    async fn advance(&mut self, requester_id: Uuid, from_auto_mode: bool) {
        let command = RequestAdvance {
            requester_id,
            from_auto_mode,
        };
        let outcome = handle_request_advance(
            &command,
            &mut self.progression,
            self.services.roster.as_ref(),
            self.services.sessions.as_ref(),
        )
        .await;

        match outcome {
            AdvanceOutcome::Advanced { .. } => {
                // A manual advance overtook a running countdown; its expiry
                // must not move the next step too.
                if self.progression.state().is_auto_mode {
                    self.stop_countdown();
                    self.progression.set_auto_mode(false);
                }
                self.publish_progression();
                self.enter_auto_mode_if_unattended();
            }
            AdvanceOutcome::Ended => {
                self.stop_countdown();
                self.progression.set_auto_mode(false);
                self.publish_progression();
            }
            AdvanceOutcome::Ignored(_) => {}
        }
    }

    fn enter_auto_mode_if_unattended(&mut self) {
        if evaluate_auto_mode(&mut self.progression, self.services.roster.as_ref()).is_some() {
            self.publish_progression();
            self.start_countdown();
        }
    }

    async fn auto_mode_expired(&mut self, epoch: u64) {
        if self.countdown.as_ref().is_none_or(|c| c.epoch != epoch) {
            debug!(epoch, "stale auto-mode expiry ignored");
            return;
        }
        self.countdown = None;
        if !handle_auto_mode_expired(&mut self.progression) {
            return;
        }
        info!("auto-mode countdown expired");
        self.publish_progression();
        self.advance(self.authority_user_id, true).await;
    }

    fn start_countdown(&mut self) {
        self.stop_countdown();
        self.countdown_epoch += 1;
        let epoch = self.countdown_epoch;
        let cancel = self.cancel.child_token();
        let countdown = AutoModeCountdown::new(self.config.auto_mode_ticks);
        let period = self.config.auto_mode_tick;
        let control = self.control.clone();
        let token = cancel.clone();
        tokio::spawn(
            async move {
                if run_auto_mode_countdown(countdown, period, token).await == Tick::Expired {
                    let _ = control.send(Control::AutoModeExpired { epoch });
                }
            }
            .in_current_span(),
        );
        debug!(epoch, ticks = self.config.auto_mode_ticks, "auto-mode countdown started");
        self.countdown = Some(Countdown { epoch, cancel });
    }

    fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel.cancel();
            debug!(epoch = countdown.epoch, "auto-mode countdown stopped");
        }
    }

    fn publish_progression(&mut self) {
        for event in self.progression.take_uncommitted_events() {
            debug!(event = event.event_type(), "broadcasting");
            self.broadcaster.broadcast(Notification::from(event.kind));
        }
    }

    fn publish_review_phase(&mut self) {
        for event in self.phase.take_uncommitted_events() {
            debug!(event = event.event_type(), "broadcasting");
            if let Some(notification) = Notification::from_review_event(event.kind) {
                self.broadcaster.broadcast(notification);
            }
        }
    }
}

