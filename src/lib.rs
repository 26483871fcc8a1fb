pub mod config;
pub mod device;
pub mod notify;
pub mod questions;
pub mod session;

pub use config::Config;
pub use device::{
    DeviceAcquirer, DeviceError, DeviceKind, DeviceRequest, MediaHandle, NullAcquirer,
};
pub use notify::{LogNotifier, NoticeKind, Notifier};
pub use questions::{Question, QuestionBank};
pub use session::{
    AdvanceOutcome, InterviewState, PauseOutcome, Phase, SessionConfig, SessionController,
    SessionError, SessionHandle, SessionSnapshot, SessionSummary, TickOutcome,
};
