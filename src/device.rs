use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Capture device category, toggled independently during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Camera,
    Microphone,
}

/// Which tracks an acquisition should open
#[derive(Debug, Clone, Copy)]
pub struct DeviceRequest {
    pub video: bool,
    pub audio: bool,
}

impl DeviceRequest {
    pub fn for_kind(kind: DeviceKind) -> Self {
        match kind {
            DeviceKind::Camera => Self { video: true, audio: false },
            DeviceKind::Microphone => Self { video: false, audio: true },
        }
    }
}

/// A granted capture stream
///
/// The handle stands in for the live stream owned by the acquirer; holding it
/// keeps the stream open, returning it via `release` closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHandle {
    pub id: Uuid,
    pub video: bool,
    pub audio: bool,
}

impl MediaHandle {
    pub fn new(video: bool, audio: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            video,
            audio,
        }
    }
}

/// Why an acquisition failed
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device access denied")]
    PermissionDenied,

    #[error("no matching capture device found")]
    NotFound,

    #[error("capture backend error: {0}")]
    Backend(String),
}

/// Grants and revokes access to camera/microphone streams
///
/// Acquisition is asynchronous; callers must not assume a grant arrives before
/// the user has already toggled the device off again.
#[async_trait]
pub trait DeviceAcquirer: Send + Sync {
    /// Request access to the devices named in `request`
    async fn acquire(&self, request: DeviceRequest) -> Result<MediaHandle, DeviceError>;

    /// Return a previously granted handle, closing its stream
    async fn release(&self, handle: MediaHandle);
}

/// Acquirer that always grants without opening real hardware
///
/// Frame capture is outside this crate; the session only tracks when devices
/// should be live. This implementation backs the CLI runner and any embedding
/// that wires capture up elsewhere.
pub struct NullAcquirer;

#[async_trait]
impl DeviceAcquirer for NullAcquirer {
    async fn acquire(&self, request: DeviceRequest) -> Result<MediaHandle, DeviceError> {
        let handle = MediaHandle::new(request.video, request.audio);
        info!(
            "Granted media handle {} (video={}, audio={})",
            handle.id, handle.video, handle.audio
        );
        Ok(handle)
    }

    async fn release(&self, handle: MediaHandle) {
        info!("Released media handle {}", handle.id);
    }
}
