//! NativeCaptureWatcher: capture a photo via the externally installed camera
//! application and recover the resulting file from disk.
//!
//! The external application is not controlled by this process, so completion
//! cannot be observed via a direct API. Instead the watcher:
//!
//! 1. Launches the platform's default capture handler via the
//!    [`CaptureIntentLauncher`] trait (fail fast on refusal).
//! 2. Brings it to the foreground, best-effort.
//! 3. Observes the camera output directory for file-creation events with a
//!    bounded wait; only the FIRST matching creation within the window
//!    counts, delivered through a single-shot channel.
//! 4. Infers write-completion with stabilization polling: the file's size is
//!    sampled on a fixed cadence, and two identical consecutive samples are
//!    taken as "write finished". The loop is bounded so a stuck capture
//!    never blocks a session indefinitely.
//!
//! The size-stabilization heuristic is a pragmatic proxy for "file write
//! finished" that tolerates incremental flush behaviour of camera apps.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use cam_core::CameraError;

/// File extensions the directory observation accepts as photos.
const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Opaque "open the default handler for the capture intent" primitive.
///
/// Implementations live in the infrastructure layer (a real launcher that
/// spawns the configured camera application, plus an in-memory mock).
pub trait CaptureIntentLauncher: Send + Sync {
    /// Asks the OS to start the default capture application.
    ///
    /// # Errors
    ///
    /// [`CameraError::LaunchFailed`] if the OS refuses to start it.
    fn launch_capture_app(&self) -> Result<(), CameraError>;

    /// Re-activates/focuses the capture application. Best-effort: callers
    /// log failures and continue.
    fn bring_to_front(&self) -> Result<(), CameraError>;
}

/// Per-process watcher for native-app captures.
///
/// The watcher itself is stateless between requests; all per-attempt state
/// (the observation registration, the cancellation channel, the detected
/// path) lives on the stack of one `capture_via_native_app` call and is
/// destroyed when the request completes or times out.
pub struct NativeCaptureWatcher {
    launcher: Arc<dyn CaptureIntentLauncher>,
    watch_dir: PathBuf,
    watch_timeout: Duration,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl NativeCaptureWatcher {
    pub fn new(
        launcher: Arc<dyn CaptureIntentLauncher>,
        watch_dir: PathBuf,
        watch_timeout: Duration,
        poll_interval: Duration,
        poll_attempts: u32,
    ) -> Self {
        Self {
            launcher,
            watch_dir,
            watch_timeout,
            poll_interval,
            poll_attempts,
        }
    }

    /// Runs one full native-capture attempt and returns the finished photo.
    ///
    /// # Errors
    ///
    /// - [`CameraError::LaunchFailed`] — the capture app would not start.
    /// - [`CameraError::WatchTimeout`] — no matching file appeared within
    ///   the observation window.
    /// - [`CameraError::StabilizeTimeout`] — a file appeared but its size
    ///   was still changing when the attempt budget ran out.
    /// - [`CameraError::Io`] — filesystem failures that outlived the retry
    ///   budget.
    pub async fn capture_via_native_app(&self) -> Result<(PathBuf, Vec<u8>), CameraError> {
        self.launcher.launch_capture_app()?;

        if let Err(err) = self.launcher.bring_to_front() {
            warn!("could not focus capture app (continuing): {err}");
        }

        tokio::fs::create_dir_all(&self.watch_dir).await?;

        let path = self.wait_for_new_photo().await?;
        info!("new photo detected at {}", path.display());

        self.stabilize_and_read(&path).await
    }

    /// Observes the watch directory until the first matching creation event
    /// or the timeout, whichever comes first.
    ///
    /// The wait resolves through a single-shot channel: the observation
    /// callback takes the sender out of its slot on the first hit, so later
    /// creations within the window are ignored by construction. The watcher
    /// registration is dropped on every exit path.
    pub async fn wait_for_new_photo(&self) -> Result<PathBuf, CameraError> {
        let (first_hit_tx, first_hit_rx) = oneshot::channel::<PathBuf>();
        let slot = StdMutex::new(Some(first_hit_tx));

        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                match result {
                    Ok(event) => {
                        if !matches!(event.kind, EventKind::Create(_)) {
                            return;
                        }
                        let Some(path) =
                            event.paths.into_iter().find(|p| has_photo_extension(p))
                        else {
                            return;
                        };
                        let Ok(mut sender) = slot.lock() else {
                            return;
                        };
                        // Only the first creation within the window counts.
                        if let Some(tx) = sender.take() {
                            let _ = tx.send(path);
                        }
                    }
                    Err(err) => warn!("directory watcher error: {err}"),
                }
            })
            .map_err(watch_registration_error)?;

        watcher
            .watch(&self.watch_dir, RecursiveMode::NonRecursive)
            .map_err(watch_registration_error)?;
        debug!("watching {} for new photos", self.watch_dir.display());

        let outcome = tokio::time::timeout(self.watch_timeout, first_hit_rx).await;

        // Deregister before inspecting the outcome so the watch handle never
        // leaks past the observation window.
        drop(watcher);

        match outcome {
            Ok(Ok(path)) => Ok(path),
            // The sender is only dropped with the watcher, so a recv error
            // is equivalent to "no event fired".
            Ok(Err(_)) | Err(_) => Err(CameraError::WatchTimeout),
        }
    }

    /// Polls the detected file's size until two consecutive samples match,
    /// then reads it fully.
    ///
    /// Transient I/O failures (the camera app may hold the file exclusively
    /// while flushing) retry on the same cadence. Exhausting the budget
    /// right after an I/O failure surfaces that failure; exhausting it with
    /// the size still moving is a [`CameraError::StabilizeTimeout`].
    pub async fn stabilize_and_read(
        &self,
        path: &Path,
    ) -> Result<(PathBuf, Vec<u8>), CameraError> {
        // Sentinel "unknown": the first sample never counts as stable.
        let mut previous_size: Option<u64> = None;
        let mut last_io_error: Option<std::io::Error> = None;

        for attempt in 0..self.poll_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.poll_interval).await;
            }

            let size = match tokio::fs::metadata(path).await {
                Ok(meta) => meta.len(),
                Err(err) => {
                    debug!("stat attempt {attempt} failed on {}: {err}", path.display());
                    last_io_error = Some(err);
                    continue;
                }
            };

            if previous_size == Some(size) {
                // Two identical consecutive samples: the write is finished.
                match tokio::fs::read(path).await {
                    Ok(bytes) => {
                        debug!(
                            "photo stabilized at {size} bytes after {} attempt(s)",
                            attempt + 1
                        );
                        return Ok((path.to_path_buf(), bytes));
                    }
                    Err(err) => {
                        debug!("read attempt {attempt} failed on {}: {err}", path.display());
                        last_io_error = Some(err);
                        continue;
                    }
                }
            }

            previous_size = Some(size);
            last_io_error = None;
        }

        match last_io_error {
            Some(err) => Err(CameraError::Io(err)),
            None => Err(CameraError::StabilizeTimeout),
        }
    }
}

/// Returns `true` when the path carries one of the accepted photo extensions.
fn has_photo_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            PHOTO_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

fn watch_registration_error(err: notify::Error) -> CameraError {
    CameraError::Io(std::io::Error::other(err))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
