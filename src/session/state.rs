use crate::device::DeviceKind;
use crate::questions::Question;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level state of an interview session
///
/// Exactly one phase holds at any instant; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    Completed,
}

/// Errors surfaced by session operations
///
/// Everything else in the state machine is a guarded no-op rather than an
/// error path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("invalid session configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result of delivering a one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown decremented; seconds now remaining
    Counted(u32),
    /// Countdown reached zero; the caller must advance
    Expired,
    /// Not running; the tick was discarded
    Ignored,
}

/// Result of advancing to the next question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the question at this index, countdown reset
    Moved(usize),
    /// The last question was finished; the session is complete
    Completed,
    /// Not started yet, or already complete
    Ignored,
}

/// Result of toggling pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOutcome {
    Paused,
    Resumed,
    /// Toggle outside Running/Paused; nothing changed
    Ignored,
}

/// The interview state machine
///
/// Owns the question sequence, the current-question cursor, the per-question
/// countdown, the phase, and the device-enable flags. All transitions are
/// synchronous and total; timing and device lifecycle live in the controller
/// that drives this machine.
#[derive(Debug, Clone)]
pub struct InterviewState {
    questions: Vec<Question>,
    seconds_per_question: u32,
    phase: Phase,
    current_index: usize,
    remaining_seconds: u32,
    camera_enabled: bool,
    mic_enabled: bool,
    transcript: String,
}

impl InterviewState {
    /// Create a machine over a fixed question sequence
    ///
    /// Camera and microphone start enabled; acquisition failures may force
    /// them off later.
    pub fn new(questions: Vec<Question>, seconds_per_question: u32) -> Self {
        Self {
            questions,
            seconds_per_question,
            phase: Phase::NotStarted,
            current_index: 0,
            remaining_seconds: seconds_per_question,
            camera_enabled: true,
            mic_enabled: true,
            transcript: String::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn camera_enabled(&self) -> bool {
        self.camera_enabled
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Begin the session: NotStarted -> Running on question 0
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if self.questions.is_empty() {
            return Err(SessionError::InvalidConfiguration(
                "question bank is empty".to_string(),
            ));
        }
        if self.seconds_per_question == 0 {
            return Err(SessionError::InvalidConfiguration(
                "seconds per question must be positive".to_string(),
            ));
        }

        self.phase = Phase::Running;
        self.current_index = 0;
        self.remaining_seconds = self.seconds_per_question;
        Ok(())
    }

    /// Deliver one elapsed second
    ///
    /// Ticks are only counted while Running; a tick that was queued before a
    /// pause took effect lands here as `Ignored`.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Counted(self.remaining_seconds)
        }
    }

    /// Running <-> Paused; ignored in NotStarted/Completed
    pub fn toggle_pause(&mut self) -> PauseOutcome {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                PauseOutcome::Paused
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                PauseOutcome::Resumed
            }
            Phase::NotStarted | Phase::Completed => PauseOutcome::Ignored,
        }
    }

    /// Move to the next question, or complete the session on the last one
    ///
    /// The cursor only moves forward, one step at a time. Moving resets the
    /// countdown and clears the transcript; advancing from Paused resumes
    /// Running. Calling this once Completed is a no-op.
    pub fn advance(&mut self) -> AdvanceOutcome {
        match self.phase {
            Phase::Running | Phase::Paused => {
                if self.current_index + 1 >= self.questions.len() {
                    self.phase = Phase::Completed;
                    AdvanceOutcome::Completed
                } else {
                    self.current_index += 1;
                    self.remaining_seconds = self.seconds_per_question;
                    self.transcript.clear();
                    self.phase = Phase::Running;
                    AdvanceOutcome::Moved(self.current_index)
                }
            }
            Phase::NotStarted | Phase::Completed => AdvanceOutcome::Ignored,
        }
    }

    /// Flip the camera flag; returns the new value
    pub fn toggle_camera(&mut self) -> bool {
        self.camera_enabled = !self.camera_enabled;
        self.camera_enabled
    }

    /// Flip the microphone flag; returns the new value
    pub fn toggle_mic(&mut self) -> bool {
        self.mic_enabled = !self.mic_enabled;
        self.mic_enabled
    }

    /// Force a device flag off after a failed acquisition
    pub(crate) fn disable_device(&mut self, kind: DeviceKind) {
        match kind {
            DeviceKind::Camera => self.camera_enabled = false,
            DeviceKind::Microphone => self.mic_enabled = false,
        }
    }

    /// Append recognized speech for the current question
    ///
    /// Recognition only runs while the session is Running; text arriving in
    /// any other phase is dropped. The buffer is cleared on question change.
    pub fn append_transcript(&mut self, text: &str) {
        if self.phase != Phase::Running || text.is_empty() {
            return;
        }
        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(text);
    }
}
