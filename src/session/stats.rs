use super::state::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Handoff emitted once when a session completes
///
/// The results collaborator that scores and presents the interview consumes
/// this; nothing here is retained by the session itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier
    pub session_id: String,

    /// Number of questions presented before completion
    pub questions_presented: usize,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Total elapsed wall-clock time in seconds
    pub total_duration_secs: f64,
}

/// Point-in-time view of a running session, for any frontend to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Current phase
    pub phase: Phase,

    /// 0-based index of the current question
    pub question_index: usize,

    /// Total number of questions in the session
    pub question_total: usize,

    /// Text of the current question, if any
    pub question: Option<String>,

    /// Seconds left on the current question's countdown
    pub remaining_seconds: u32,

    /// Whether the camera toggle is on
    pub camera_enabled: bool,

    /// Whether the microphone toggle is on
    pub mic_enabled: bool,

    /// Recognized speech accumulated for the current question
    pub transcript: String,
}
