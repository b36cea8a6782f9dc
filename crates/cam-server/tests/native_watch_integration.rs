//! Integration tests for the native-capture watcher.
//!
//! These tests exercise [`NativeCaptureWatcher`] through its public API the
//! same way the dispatch layer uses it, against a real temporary directory
//! and a real `notify` watcher. Timings are shortened via the watcher's
//! constructor so the bounded waits complete in milliseconds instead of the
//! production 60 s / 20×500 ms budgets.
//!
//! The external camera application is replaced by either a test task writing
//! files into the watched directory (simulating the app saving a photo) or
//! by nothing at all (simulating a stuck capture).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cam_server::application::native::{CaptureIntentLauncher, NativeCaptureWatcher};
use cam_server::infrastructure::launcher::mock::MockCaptureLauncher;

use cam_core::CameraError;

fn make_watcher(
    watch_dir: PathBuf,
    launcher: Arc<MockCaptureLauncher>,
    watch_timeout: Duration,
    poll_interval: Duration,
    poll_attempts: u32,
) -> NativeCaptureWatcher {
    NativeCaptureWatcher::new(
        launcher as Arc<dyn CaptureIntentLauncher>,
        watch_dir,
        watch_timeout,
        poll_interval,
        poll_attempts,
    )
}

// ── Detection window ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_no_file_within_window_is_a_watch_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(MockCaptureLauncher::new());
    let watcher = make_watcher(
        dir.path().join("Camera"),
        Arc::clone(&launcher),
        Duration::from_millis(200),
        Duration::from_millis(10),
        5,
    );

    let err = watcher.capture_via_native_app().await.unwrap_err();

    // A timeout is never a success with empty data.
    assert!(matches!(err, CameraError::WatchTimeout));
    assert_eq!(err.to_string(), "no new photo detected");
    assert_eq!(launcher.launch_count(), 1);
}

#[tokio::test]
async fn test_new_photo_is_detected_and_returned() {
    let dir = tempfile::tempdir().unwrap();
    let watch_dir = dir.path().join("Camera");
    let launcher = Arc::new(MockCaptureLauncher::new());
    let watcher = make_watcher(
        watch_dir.clone(),
        Arc::clone(&launcher),
        Duration::from_secs(5),
        Duration::from_millis(25),
        20,
    );

    // Simulate the camera app saving a photo shortly after launch.
    let photo_path = watch_dir.join("IMG_0001.jpg");
    let writer = {
        let photo_path = photo_path.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            std::fs::write(&photo_path, b"finished-photo").unwrap();
        })
    };

    let (path, bytes) = watcher.capture_via_native_app().await.unwrap();
    writer.join().unwrap();

    assert_eq!(path, photo_path);
    assert_eq!(bytes, b"finished-photo");
    assert_eq!(launcher.launch_count(), 1);
    assert_eq!(launcher.focus_count(), 1);
}

#[tokio::test]
async fn test_non_photo_files_do_not_satisfy_the_watch() {
    let dir = tempfile::tempdir().unwrap();
    let watch_dir = dir.path().join("Camera");
    let launcher = Arc::new(MockCaptureLauncher::new());
    let watcher = make_watcher(
        watch_dir.clone(),
        launcher,
        Duration::from_secs(5),
        Duration::from_millis(25),
        20,
    );

    let writer = {
        let watch_dir = watch_dir.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            // A video file must be ignored by the extension filter.
            std::fs::write(watch_dir.join("clip.mp4"), b"not-a-photo").unwrap();
            std::thread::sleep(Duration::from_millis(200));
            std::fs::write(watch_dir.join("shot.jpeg"), b"the-photo").unwrap();
        })
    };

    let (path, bytes) = watcher.capture_via_native_app().await.unwrap();
    writer.join().unwrap();

    assert!(path.ends_with("shot.jpeg"));
    assert_eq!(bytes, b"the-photo");
}

// ── Launch behaviour ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_launch_refusal_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(MockCaptureLauncher::failing_launch());
    let watcher = make_watcher(
        dir.path().join("Camera"),
        Arc::clone(&launcher),
        Duration::from_secs(60),
        Duration::from_millis(500),
        20,
    );

    let start = std::time::Instant::now();
    let err = watcher.capture_via_native_app().await.unwrap_err();

    assert!(matches!(err, CameraError::LaunchFailed(_)));
    // Fail-fast: the 60 s observation window must never have started.
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(launcher.focus_count(), 0, "focus is skipped after a failed launch");
}

#[tokio::test]
async fn test_focus_failure_is_best_effort_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let watch_dir = dir.path().join("Camera");
    let launcher = Arc::new(MockCaptureLauncher::failing_focus());
    let watcher = make_watcher(
        watch_dir.clone(),
        launcher,
        Duration::from_secs(5),
        Duration::from_millis(25),
        20,
    );

    let writer = {
        let watch_dir = watch_dir.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            std::fs::write(watch_dir.join("pic.png"), b"png-bytes").unwrap();
        })
    };

    let result = watcher.capture_via_native_app().await;
    writer.join().unwrap();

    assert!(result.is_ok(), "a focus failure must not abort the capture");
}

// ── Stabilization polling ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_steady_file_stabilizes_on_the_second_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("done.jpg");
    std::fs::write(&path, b"fully-written").unwrap();

    let watcher = make_watcher(
        dir.path().to_path_buf(),
        Arc::new(MockCaptureLauncher::new()),
        Duration::from_secs(1),
        Duration::from_millis(10),
        20,
    );

    let (returned, bytes) = watcher.stabilize_and_read(&path).await.unwrap();
    assert_eq!(returned, path);
    assert_eq!(bytes, b"fully-written");
}

#[tokio::test]
async fn test_single_sample_is_never_treated_as_stable() {
    // With an attempt budget of one, the sentinel "unknown" previous size
    // means stability can never be proven, even for a steady file.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("done.jpg");
    std::fs::write(&path, b"steady").unwrap();

    let watcher = make_watcher(
        dir.path().to_path_buf(),
        Arc::new(MockCaptureLauncher::new()),
        Duration::from_secs(1),
        Duration::from_millis(10),
        1,
    );

    let err = watcher.stabilize_and_read(&path).await.unwrap_err();
    assert!(matches!(err, CameraError::StabilizeTimeout));
}

#[tokio::test]
async fn test_growing_file_exhausts_the_attempt_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.jpg");
    std::fs::write(&path, b"start").unwrap();

    // A writer that keeps appending for much longer than the whole poll
    // budget (5 attempts × 20 ms = 100 ms), so every sample sees growth.
    let keep_growing = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let writer = {
        let path = path.clone();
        let keep_growing = Arc::clone(&keep_growing);
        std::thread::spawn(move || {
            use std::io::Write;
            let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
            while keep_growing.load(std::sync::atomic::Ordering::Relaxed) {
                file.write_all(&[0u8; 1024]).unwrap();
                file.flush().unwrap();
                std::thread::sleep(Duration::from_millis(2));
            }
        })
    };

    let watcher = make_watcher(
        dir.path().to_path_buf(),
        Arc::new(MockCaptureLauncher::new()),
        Duration::from_secs(1),
        Duration::from_millis(20),
        5,
    );

    let err = watcher.stabilize_and_read(&path).await.unwrap_err();
    keep_growing.store(false, std::sync::atomic::Ordering::Relaxed);
    writer.join().unwrap();

    assert!(matches!(err, CameraError::StabilizeTimeout));
}

#[tokio::test]
async fn test_persistent_io_failure_surfaces_the_io_error() {
    // The file never exists, so every stat attempt fails; exhausting the
    // budget must surface the underlying I/O error, not a timeout.
    let dir = tempfile::tempdir().unwrap();
    let watcher = make_watcher(
        dir.path().to_path_buf(),
        Arc::new(MockCaptureLauncher::new()),
        Duration::from_secs(1),
        Duration::from_millis(5),
        3,
    );

    let err = watcher
        .stabilize_and_read(&dir.path().join("never-created.jpg"))
        .await
        .unwrap_err();

    assert!(matches!(err, CameraError::Io(_)));
}
