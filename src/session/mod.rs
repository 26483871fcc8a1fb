//! Interview session management
//!
//! This module provides the interview-session state machine and its driver:
//! - Question sequence and current-question cursor
//! - Per-question countdown with pause/resume
//! - Camera/microphone enable flags and device lifecycle
//! - Transition notifications and the completion handoff

mod config;
mod controller;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::{SessionController, SessionHandle};
pub use state::{
    AdvanceOutcome, InterviewState, PauseOutcome, Phase, SessionError, TickOutcome,
};
pub use stats::{SessionSnapshot, SessionSummary};
