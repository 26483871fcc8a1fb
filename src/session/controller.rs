use super::config::SessionConfig;
use super::state::{AdvanceOutcome, InterviewState, PauseOutcome, Phase, SessionError, TickOutcome};
use super::stats::{SessionSnapshot, SessionSummary};
use crate::device::{DeviceAcquirer, DeviceError, DeviceKind, DeviceRequest, MediaHandle};
use crate::notify::{NoticeKind, Notifier};
use crate::questions::QuestionBank;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tracing::{debug, info, warn};

const TICK_PERIOD: Duration = Duration::from_secs(1);
const COMMAND_BUFFER: usize = 64;

/// Commands accepted by a running controller
enum Command {
    Start {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    TogglePause,
    Advance,
    ToggleCamera,
    ToggleMic,
    PushTranscript(String),
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Everything entering the controller's event loop
///
/// User commands and device-acquisition results share one queue so state
/// transitions are applied strictly in arrival order.
enum Event {
    Command(Command),
    DeviceReady {
        kind: DeviceKind,
        result: Result<MediaHandle, DeviceError>,
    },
}

/// Command surface of a spawned session
///
/// Cheap to clone; dropping every handle tears the session down early with
/// the same device-release guarantees as completion.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Event>,
}

impl SessionHandle {
    /// Begin the session
    ///
    /// Fails with `SessionError::InvalidConfiguration` for an empty question
    /// bank and `SessionError::AlreadyStarted` outside NotStarted; both are
    /// downcastable from the returned error.
    pub async fn start(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { reply }).await?;
        rx.await.context("session controller stopped")??;
        Ok(())
    }

    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(Command::TogglePause).await
    }

    pub async fn advance(&self) -> Result<()> {
        self.send(Command::Advance).await
    }

    pub async fn toggle_camera(&self) -> Result<()> {
        self.send(Command::ToggleCamera).await
    }

    pub async fn toggle_mic(&self) -> Result<()> {
        self.send(Command::ToggleMic).await
    }

    /// Feed recognized speech into the current question's transcript slot
    pub async fn push_transcript(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::PushTranscript(text.into())).await
    }

    /// Point-in-time view of the session state
    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.context("session controller stopped")
    }

    /// Tear the session down before completion
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(Event::Command(command))
            .await
            .map_err(|_| anyhow!("session controller is no longer running"))
    }
}

/// Drives one interview session on a single tokio task
///
/// Owns the state machine exclusively and mediates between timer ticks, user
/// commands, and device acquisition results. Timing comes from an explicit
/// 1-second interval rather than any rendering layer, so the whole session is
/// testable without a frontend.
pub struct SessionController {
    config: SessionConfig,
    state: InterviewState,
    acquirer: Arc<dyn DeviceAcquirer>,
    notifier: Arc<dyn Notifier>,

    /// Weak sender upgraded by acquisition tasks so results re-enter the
    /// loop without keeping the channel open once every handle is dropped
    events_tx: mpsc::WeakSender<Event>,

    camera_handle: Option<MediaHandle>,
    mic_handle: Option<MediaHandle>,

    /// Acquisitions spawned but not yet answered; drained on teardown so no
    /// granted handle is leaked
    pending_acquisitions: usize,

    /// Set once a device warning has been shown; cleared by a manual retoggle
    device_warned: bool,

    started_at: Option<DateTime<Utc>>,
    summary_tx: Option<oneshot::Sender<SessionSummary>>,
}

impl SessionController {
    /// Spawn a session over the given question bank
    ///
    /// Returns the command handle, the one-shot completion handoff for the
    /// results collaborator, and the join handle of the controller task.
    pub fn spawn(
        config: SessionConfig,
        bank: QuestionBank,
        acquirer: Arc<dyn DeviceAcquirer>,
        notifier: Arc<dyn Notifier>,
    ) -> (
        SessionHandle,
        oneshot::Receiver<SessionSummary>,
        JoinHandle<()>,
    ) {
        let (events_tx, events_rx) = mpsc::channel(COMMAND_BUFFER);
        let (summary_tx, summary_rx) = oneshot::channel();

        let state = InterviewState::new(bank.into_questions(), config.seconds_per_question);

        info!("Creating interview session: {}", config.session_id);

        let controller = Self {
            config,
            state,
            acquirer,
            notifier,
            events_tx: events_tx.downgrade(),
            camera_handle: None,
            mic_handle: None,
            pending_acquisitions: 0,
            device_warned: false,
            started_at: None,
            summary_tx: Some(summary_tx),
        };

        let task = tokio::spawn(controller.run(events_rx));

        (SessionHandle { tx: events_tx }, summary_rx, task)
    }

    async fn run(mut self, mut events_rx: mpsc::Receiver<Event>) {
        let mut ticker = tokio::time::interval(TICK_PERIOD);

        loop {
            let stop = tokio::select! {
                event = events_rx.recv() => match event {
                    Some(Event::Command(command)) => {
                        self.handle_command(command, &mut ticker).await
                    }
                    Some(Event::DeviceReady { kind, result }) => {
                        self.handle_device_ready(kind, result).await;
                        false
                    }
                    // Every handle dropped: abandon the session
                    None => true,
                },
                _ = ticker.tick(), if self.state.phase() == Phase::Running => {
                    self.handle_tick(&mut ticker).await;
                    false
                }
            };

            if stop || self.state.phase() == Phase::Completed {
                break;
            }
        }

        self.teardown(&mut events_rx).await;
    }

    /// Apply one user command; returns true when the loop should stop
    async fn handle_command(&mut self, command: Command, ticker: &mut Interval) -> bool {
        match command {
            Command::Start { reply } => {
                let result = self.handle_start(ticker);
                let _ = reply.send(result);
            }

            Command::TogglePause => match self.state.toggle_pause() {
                PauseOutcome::Paused => {
                    info!("Interview paused: {}", self.config.session_id);
                    self.notifier.notify(NoticeKind::Info, "Interview paused");
                }
                PauseOutcome::Resumed => {
                    // Fresh period from the moment of resuming; no catch-up
                    // ticks for the paused stretch
                    ticker.reset();
                    info!("Interview resumed: {}", self.config.session_id);
                    self.notifier.notify(NoticeKind::Info, "Interview resumed");
                }
                PauseOutcome::Ignored => {
                    debug!("Pause toggle ignored in phase {:?}", self.state.phase());
                }
            },

            Command::Advance => self.apply_advance(ticker),

            Command::ToggleCamera => self.handle_device_toggle(DeviceKind::Camera).await,

            Command::ToggleMic => self.handle_device_toggle(DeviceKind::Microphone).await,

            Command::PushTranscript(text) => self.state.append_transcript(&text),

            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }

            Command::Shutdown => {
                info!("Shutdown requested: {}", self.config.session_id);
                return true;
            }
        }

        false
    }

    fn handle_start(&mut self, ticker: &mut Interval) -> Result<(), SessionError> {
        match self.state.start() {
            Ok(()) => {
                self.started_at = Some(Utc::now());
                ticker.reset();

                info!(
                    "Interview session started: {} ({} questions, {}s each)",
                    self.config.session_id,
                    self.state.question_count(),
                    self.config.seconds_per_question
                );
                self.notifier.notify(NoticeKind::Info, "Interview started");

                // Device access is requested asynchronously; the session runs
                // regardless of the outcome
                if self.state.camera_enabled() {
                    self.request_device(DeviceKind::Camera);
                }
                if self.state.mic_enabled() {
                    self.request_device(DeviceKind::Microphone);
                }

                Ok(())
            }
            Err(err) => {
                warn!("Cannot start session {}: {}", self.config.session_id, err);
                Err(err)
            }
        }
    }

    async fn handle_tick(&mut self, ticker: &mut Interval) {
        // A tick queued just before a pause lands here after the phase has
        // already changed; discard it
        match self.state.tick() {
            TickOutcome::Counted(_) | TickOutcome::Ignored => {}
            // The automatic advance runs inside the tick handler, so it
            // precedes any manual advance still waiting in the queue
            TickOutcome::Expired => {
                info!(
                    "Time expired on question {}",
                    self.state.current_index() + 1
                );
                self.apply_advance(ticker);
            }
        }
    }

    fn apply_advance(&mut self, ticker: &mut Interval) {
        match self.state.advance() {
            AdvanceOutcome::Moved(index) => {
                ticker.reset();
                info!(
                    "Moved to question {} of {}",
                    index + 1,
                    self.state.question_count()
                );
                self.notifier.notify(
                    NoticeKind::Info,
                    &format!(
                        "Moving to question {} of {}",
                        index + 1,
                        self.state.question_count()
                    ),
                );
            }
            AdvanceOutcome::Completed => self.finish(),
            AdvanceOutcome::Ignored => {
                debug!("Advance ignored in phase {:?}", self.state.phase());
            }
        }
    }

    async fn handle_device_toggle(&mut self, kind: DeviceKind) {
        let enabled = match kind {
            DeviceKind::Camera => self.state.toggle_camera(),
            DeviceKind::Microphone => self.state.toggle_mic(),
        };

        info!("{kind:?} toggled {}", if enabled { "on" } else { "off" });

        if enabled {
            // A manual retoggle after a failure is the one retry path; let it
            // warn again if it fails too
            self.device_warned = false;
            if self.state.phase() != Phase::NotStarted {
                self.request_device(kind);
            }
        } else {
            let handle = match kind {
                DeviceKind::Camera => self.camera_handle.take(),
                DeviceKind::Microphone => self.mic_handle.take(),
            };
            if let Some(handle) = handle {
                self.acquirer.release(handle).await;
            }
        }
    }

    /// Ask the acquirer for one device without blocking the loop; the result
    /// comes back as an event
    fn request_device(&mut self, kind: DeviceKind) {
        let Some(events_tx) = self.events_tx.upgrade() else {
            return;
        };
        self.pending_acquisitions += 1;

        let acquirer = Arc::clone(&self.acquirer);

        tokio::spawn(async move {
            let result = acquirer.acquire(DeviceRequest::for_kind(kind)).await;
            let _ = events_tx.send(Event::DeviceReady { kind, result }).await;
        });
    }

    async fn handle_device_ready(
        &mut self,
        kind: DeviceKind,
        result: Result<MediaHandle, DeviceError>,
    ) {
        self.pending_acquisitions = self.pending_acquisitions.saturating_sub(1);

        match result {
            Ok(handle) => {
                let still_wanted = match kind {
                    DeviceKind::Camera => self.state.camera_enabled(),
                    DeviceKind::Microphone => self.state.mic_enabled(),
                };

                // The user may have toggled the device off (or the session may
                // have ended) while acquisition was in flight
                if !still_wanted || self.state.phase() == Phase::Completed {
                    self.acquirer.release(handle).await;
                    return;
                }

                info!("{kind:?} acquired: handle {}", handle.id);
                match kind {
                    DeviceKind::Camera => self.camera_handle = Some(handle),
                    DeviceKind::Microphone => self.mic_handle = Some(handle),
                }
            }
            Err(err) => {
                warn!("{kind:?} acquisition failed: {err}");
                self.state.disable_device(kind);

                // One warning per start/retoggle, even when both devices fail
                if !self.device_warned && self.state.phase() != Phase::Completed {
                    self.device_warned = true;
                    self.notifier.notify(
                        NoticeKind::Warning,
                        "Camera or microphone unavailable; continuing without it",
                    );
                }
            }
        }
    }

    /// Terminal transition: emit the completion handoff
    fn finish(&mut self) {
        info!("Interview session complete: {}", self.config.session_id);
        self.notifier.notify(NoticeKind::Info, "Interview complete");

        let started_at = self.started_at.unwrap_or_else(Utc::now);
        let elapsed = Utc::now().signed_duration_since(started_at);

        let summary = SessionSummary {
            session_id: self.config.session_id.clone(),
            questions_presented: self.state.current_index() + 1,
            started_at,
            total_duration_secs: elapsed.num_milliseconds() as f64 / 1000.0,
        };

        if let Some(tx) = self.summary_tx.take() {
            if tx.send(summary).is_err() {
                debug!("No results collaborator listening for the summary");
            }
        }
    }

    /// Release every device handle, including grants still in flight
    ///
    /// Runs on every exit path: completion, shutdown, and abandonment.
    async fn teardown(&mut self, events_rx: &mut mpsc::Receiver<Event>) {
        while self.pending_acquisitions > 0 {
            match events_rx.recv().await {
                Some(Event::DeviceReady { kind, result }) => {
                    self.handle_device_ready(kind, result).await;
                }
                Some(Event::Command(_)) => {}
                None => break,
            }
        }

        if let Some(handle) = self.camera_handle.take() {
            self.acquirer.release(handle).await;
        }
        if let Some(handle) = self.mic_handle.take() {
            self.acquirer.release(handle).await;
        }

        info!("Interview session torn down: {}", self.config.session_id);
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.state.phase(),
            question_index: self.state.current_index(),
            question_total: self.state.question_count(),
            question: self.state.current_question().map(|q| q.text.clone()),
            remaining_seconds: self.state.remaining_seconds(),
            camera_enabled: self.state.camera_enabled(),
            mic_enabled: self.state.mic_enabled(),
            transcript: self.state.transcript().to_string(),
        }
    }
}
