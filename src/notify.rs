use tracing::{error, info, warn};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Fire-and-forget user-facing messages emitted on state transitions
///
/// The session never observes a return value; presentation (toast, status
/// line, log) is entirely the implementor's concern.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Notifier that routes notices through the tracing subscriber
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Info => info!("{message}"),
            NoticeKind::Warning => warn!("{message}"),
            NoticeKind::Error => error!("{message}"),
        }
    }
}
