// Behavior tests for the async session controller
//
// These run on a paused tokio clock so tick delivery is deterministic, and
// substitute scripted fakes for the device acquirer and notifier.

use async_trait::async_trait;
use interview_coach::{
    DeviceAcquirer, DeviceError, DeviceRequest, MediaHandle, NoticeKind, Notifier, Phase,
    Question, QuestionBank, SessionConfig, SessionController, SessionError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

/// Scripted acquirer: can fail, can delay, and counts grants/releases
#[derive(Default)]
struct FakeAcquirer {
    fail: bool,
    grant_delay: Option<Duration>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl FakeAcquirer {
    fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    fn slow(delay: Duration) -> Self {
        Self { grant_delay: Some(delay), ..Self::default() }
    }

    fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceAcquirer for FakeAcquirer {
    async fn acquire(&self, request: DeviceRequest) -> Result<MediaHandle, DeviceError> {
        if let Some(delay) = self.grant_delay {
            sleep(delay).await;
        }
        if self.fail {
            return Err(DeviceError::PermissionDenied);
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MediaHandle::new(request.video, request.audio))
    }

    async fn release(&self, _handle: MediaHandle) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notifier that records every notice for later assertions
#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    fn count(&self, kind: NoticeKind) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    fn contains(&self, fragment: &str) -> bool {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(fragment))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().unwrap().push((kind, message.to_string()));
    }
}

fn bank(n: usize) -> QuestionBank {
    QuestionBank::new((0..n).map(|i| Question::new(format!("Question {}", i + 1))).collect())
}

fn config(seconds: u32) -> SessionConfig {
    SessionConfig {
        seconds_per_question: seconds,
        ..SessionConfig::default()
    }
}

/// Give spawned acquisition tasks a chance to run and report back
async fn settle() {
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn test_start_enters_running_and_acquires_devices() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let (handle, _summary_rx, _task) =
        SessionController::spawn(config(180), bank(5), acquirer.clone(), notifier.clone());

    handle.start().await.expect("start should succeed");
    settle().await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.question_index, 0);
    assert_eq!(snapshot.question_total, 5);
    assert_eq!(snapshot.remaining_seconds, 180);
    assert!(snapshot.camera_enabled);
    assert!(snapshot.mic_enabled);
    assert_eq!(snapshot.question.as_deref(), Some("Question 1"));

    // Camera and microphone are acquired as separate handles
    assert_eq!(acquirer.acquired(), 2);
    assert!(notifier.contains("Interview started"));
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_reports_already_started() {
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        Arc::new(FakeAcquirer::default()),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("first start should succeed");
    let err = handle.start().await.expect_err("second start must fail");

    assert_eq!(
        err.downcast_ref::<SessionError>(),
        Some(&SessionError::AlreadyStarted)
    );
}

#[tokio::test(start_paused = true)]
async fn test_start_with_empty_bank_is_blocked() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(0),
        acquirer.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    let err = handle.start().await.expect_err("empty bank must not start");
    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::InvalidConfiguration(_))
    ));

    let snapshot = handle.snapshot().await.expect("controller should still be alive");
    assert_eq!(snapshot.phase, Phase::NotStarted);
    assert_eq!(acquirer.acquired(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_device_failure_is_nonfatal_and_warns_once() {
    // Scenario D: acquisition fails, the session runs without the devices
    let acquirer = Arc::new(FakeAcquirer::failing());
    let notifier = Arc::new(RecordingNotifier::default());
    let (handle, _summary_rx, _task) =
        SessionController::spawn(config(180), bank(5), acquirer.clone(), notifier.clone());

    handle.start().await.expect("start should succeed despite devices");
    settle().await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.phase, Phase::Running);
    assert!(!snapshot.camera_enabled);
    assert!(!snapshot.mic_enabled);

    // Both acquisitions failed but the user is warned exactly once
    assert_eq!(notifier.count(NoticeKind::Warning), 1);
}

#[tokio::test(start_paused = true)]
async fn test_full_countdown_auto_advances() {
    // Scenario A at the controller level: 180 seconds of wall clock
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        Arc::new(FakeAcquirer::default()),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    sleep(Duration::from_millis(180_500)).await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.question_index, 1);
    assert_eq!(snapshot.remaining_seconds, 180);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_queued_across_a_pause_do_not_decrement() {
    // Scenario B at the controller level
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        Arc::new(FakeAcquirer::default()),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    sleep(Duration::from_millis(179_500)).await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.remaining_seconds, 1);

    handle.toggle_pause().await.expect("pause should send");
    sleep(Duration::from_secs(50)).await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.phase, Phase::Paused);
    assert_eq!(snapshot.remaining_seconds, 1);

    handle.toggle_pause().await.expect("resume should send");
    sleep(Duration::from_millis(1_500)).await;

    // One post-resume tick expired the countdown and auto-advanced
    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.phase, Phase::Running);
    assert_eq!(snapshot.question_index, 1);
    assert_eq!(snapshot.remaining_seconds, 180);
}

#[tokio::test(start_paused = true)]
async fn test_manual_completion_hands_off_summary_and_releases_devices() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let (handle, summary_rx, task) =
        SessionController::spawn(config(180), bank(2), acquirer.clone(), notifier.clone());

    handle.start().await.expect("start should succeed");
    settle().await;

    handle.advance().await.expect("advance should send");
    handle.advance().await.expect("advance should send");

    let summary = summary_rx.await.expect("summary should be handed off");
    assert_eq!(summary.questions_presented, 2);
    assert!(summary.total_duration_secs >= 0.0);

    task.await.expect("controller task should exit cleanly");
    assert!(notifier.contains("Interview complete"));
    assert_eq!(acquirer.released(), acquirer.acquired());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_devices() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let (handle, _summary_rx, task) = SessionController::spawn(
        config(180),
        bank(5),
        acquirer.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    settle().await;
    assert_eq!(acquirer.acquired(), 2);

    handle.shutdown().await.expect("shutdown should send");
    task.await.expect("controller task should exit cleanly");

    assert_eq!(acquirer.released(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_tears_the_session_down() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let (handle, summary_rx, task) = SessionController::spawn(
        config(180),
        bank(5),
        acquirer.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    settle().await;

    drop(handle);
    drop(summary_rx);
    task.await.expect("controller task should exit cleanly");

    assert_eq!(acquirer.released(), acquirer.acquired());
}

#[tokio::test(start_paused = true)]
async fn test_toggling_camera_off_releases_only_that_track() {
    let acquirer = Arc::new(FakeAcquirer::default());
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        acquirer.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    settle().await;
    assert_eq!(acquirer.acquired(), 2);

    handle.toggle_camera().await.expect("toggle should send");
    settle().await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert!(!snapshot.camera_enabled);
    assert!(snapshot.mic_enabled);
    assert_eq!(acquirer.released(), 1);

    // Toggling back on acquires a fresh camera handle
    handle.toggle_camera().await.expect("toggle should send");
    settle().await;
    assert_eq!(acquirer.acquired(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_grant_arriving_after_toggle_off_is_released() {
    let acquirer = Arc::new(FakeAcquirer::slow(Duration::from_secs(5)));
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        acquirer.clone(),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    // Turn the camera off while its acquisition is still in flight
    handle.toggle_camera().await.expect("toggle should send");

    sleep(Duration::from_secs(6)).await;

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert!(!snapshot.camera_enabled);
    assert!(snapshot.mic_enabled);

    // The late camera grant was handed straight back; the mic grant is held
    assert_eq!(acquirer.acquired(), 2);
    assert_eq!(acquirer.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transcript_slot_is_cleared_on_advance() {
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        Arc::new(FakeAcquirer::default()),
        Arc::new(RecordingNotifier::default()),
    );

    handle.start().await.expect("start should succeed");
    handle.push_transcript("I enjoy solving hard problems").await.expect("push should send");

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.transcript, "I enjoy solving hard problems");

    handle.advance().await.expect("advance should send");

    let snapshot = handle.snapshot().await.expect("snapshot should succeed");
    assert_eq!(snapshot.question_index, 1);
    assert_eq!(snapshot.transcript, "");
}

#[tokio::test(start_paused = true)]
async fn test_pause_notifications_follow_the_transitions() {
    let notifier = Arc::new(RecordingNotifier::default());
    let (handle, _summary_rx, _task) = SessionController::spawn(
        config(180),
        bank(5),
        Arc::new(FakeAcquirer::default()),
        notifier.clone(),
    );

    handle.start().await.expect("start should succeed");
    handle.toggle_pause().await.expect("pause should send");
    handle.toggle_pause().await.expect("resume should send");
    settle().await;

    assert!(notifier.contains("Interview paused"));
    assert!(notifier.contains("Interview resumed"));
}
