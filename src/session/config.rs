use serde::{Deserialize, Serialize};

/// Configuration for one interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-2a1f...")
    pub session_id: String,

    /// Countdown allotted to each question
    /// Default: 180 seconds (3 minutes)
    pub seconds_per_question: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            seconds_per_question: 180, // 3 minutes per question
        }
    }
}
