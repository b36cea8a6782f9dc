//! CaptureAdapter: owns the lifecycle of the single capture-device handle.
//!
//! This use case sits at the application layer and delegates to a
//! [`CameraDriver`] trait object for device access. The driver
//! implementations live in the infrastructure layer.
//!
//! # Device lifecycle
//!
//! Every capture runs the full `initialize → configure flash → capture →
//! cleanup` cycle under one mutex guard. The device is torn down after each
//! capture rather than held open, trading per-request setup latency for
//! guaranteed availability to the next command and avoidance of device-lock
//! leaks across sessions.
//!
//! # Serialization invariant
//!
//! At most one device handle is live per process. Concurrent sessions
//! issuing capture commands queue on [`CaptureAdapter::device_lock`] rather
//! than corrupting driver state — the invariant is enforced by design, not
//! by accident of single-threaded access.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use cam_core::{CameraError, CameraFacing, CaptureRequest, FlashMode};

/// Platform-agnostic capture device driver.
///
/// The driver owns the device handle internally; at most one handle is open
/// at a time. Implementations live in the infrastructure layer (a real
/// driver shelling out to a capture tool, plus an in-memory mock for tests).
pub trait CameraDriver: Send + Sync {
    /// Opens the device matching `facing`.
    ///
    /// # Errors
    ///
    /// [`CameraError::DeviceNotFound`] if no device matches, or
    /// [`CameraError::Driver`] for any other driver-level refusal.
    fn open(&self, facing: CameraFacing) -> Result<(), CameraError>;

    /// Returns `true` while a handle is open.
    fn is_open(&self) -> bool;

    /// Sets the flash enable/auto flags on the open handle.
    ///
    /// # Errors
    ///
    /// [`CameraError::FlashUnsupported`] when the device has no flash
    /// capability (callers must treat this as a warning, not a failure).
    fn configure_flash(&self, mode: FlashMode) -> Result<(), CameraError>;

    /// Captures one still image at the requested resolution and returns the
    /// raw image bytes.
    fn capture_still(&self, width: u32, height: u32) -> Result<Vec<u8>, CameraError>;

    /// Releases the handle. Must be safe to call when no handle is open.
    fn close(&self);
}

/// Serializes all capture operations against the single underlying device.
pub struct CaptureAdapter {
    driver: Arc<dyn CameraDriver>,
    pictures_dir: PathBuf,
    /// Guards the whole initialize→capture→cleanup span so concurrent
    /// sessions queue at the device boundary.
    device_lock: tokio::sync::Mutex<()>,
}

impl CaptureAdapter {
    pub fn new(driver: Arc<dyn CameraDriver>, pictures_dir: PathBuf) -> Self {
        Self {
            driver,
            pictures_dir,
            device_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Captures one still image and persists it.
    ///
    /// Writes a uniquely named image file into the pictures location (never
    /// overwrites), reads it back fully into memory, then releases the
    /// device unconditionally — on success and on failure — so the next
    /// request always finds it available.
    ///
    /// # Errors
    ///
    /// Any [`CameraError`] from initialization, capture, or file I/O. The
    /// device is cleaned up before the error is returned.
    pub async fn capture_photo(
        &self,
        request: CaptureRequest,
    ) -> Result<(PathBuf, Vec<u8>), CameraError> {
        let _guard = self.device_lock.lock().await;

        self.initialize(request.facing)?;
        let result = self.capture_inner(request).await;

        // Unconditional teardown: success or failure, the handle is released.
        self.driver.close();

        result
    }

    /// Opens the device if no handle exists. Idempotent: a second call with
    /// a handle already open is a no-op, and the facing selection is NOT
    /// re-applied — callers must `cleanup()` first to switch facing.
    fn initialize(&self, facing: CameraFacing) -> Result<(), CameraError> {
        if self.driver.is_open() {
            debug!("device already initialized; keeping existing handle");
            return Ok(());
        }
        self.driver.open(facing)
    }

    /// Releases the device handle. Safe to call when no handle is open.
    pub async fn cleanup(&self) {
        let _guard = self.device_lock.lock().await;
        self.driver.close();
    }

    async fn capture_inner(
        &self,
        request: CaptureRequest,
    ) -> Result<(PathBuf, Vec<u8>), CameraError> {
        if let Err(err) = self.driver.configure_flash(request.flash) {
            match err {
                // Capability absence is not a failure.
                CameraError::FlashUnsupported => {
                    warn!("device has no flash capability; capturing without flash");
                }
                other => return Err(other),
            }
        }

        let image_bytes = self.driver.capture_still(request.width, request.height)?;

        tokio::fs::create_dir_all(&self.pictures_dir).await?;
        let file_path = self.unique_photo_path();

        // `create_new` guarantees we never overwrite an existing photo.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file_path)
            .await?;
        file.write_all(&image_bytes).await?;
        file.flush().await?;
        drop(file);

        // Read the file back fully so the response carries exactly what
        // landed on disk.
        let persisted = tokio::fs::read(&file_path).await?;

        Ok((file_path, persisted))
    }

    /// A pictures-dir path that cannot collide with any earlier capture.
    fn unique_photo_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        self.pictures_dir
            .join(format!("cam_{millis}_{}.jpg", Uuid::new_v4().simple()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::device::mock::MockCameraDriver;

    fn adapter_with(driver: MockCameraDriver) -> (Arc<MockCameraDriver>, CaptureAdapter) {
        let driver = Arc::new(driver);
        let dir = tempfile::tempdir().unwrap().keep();
        let adapter = CaptureAdapter::new(Arc::clone(&driver) as Arc<dyn CameraDriver>, dir);
        (driver, adapter)
    }

    #[tokio::test]
    async fn test_capture_writes_unique_file_and_reads_it_back() {
        let (_driver, adapter) = adapter_with(MockCameraDriver::with_image(b"jpeg-bytes".to_vec()));

        let (path, bytes) = adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();

        assert_eq!(bytes, b"jpeg-bytes");
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_two_captures_never_share_a_path() {
        let (_driver, adapter) = adapter_with(MockCameraDriver::new());

        let (first, _) = adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();
        let (second, _) = adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_device_released_after_successful_capture() {
        let (driver, adapter) = adapter_with(MockCameraDriver::new());

        adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();

        assert!(!driver.is_open(), "handle must be released after capture");
        assert_eq!(driver.close_count(), 1);
    }

    #[tokio::test]
    async fn test_device_released_even_when_capture_fails() {
        let (driver, adapter) = adapter_with(MockCameraDriver::failing_capture());

        let err = adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, CameraError::CaptureFailed(_)));
        assert!(!driver.is_open(), "cleanup must run on the failure path too");
        assert_eq!(driver.close_count(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_propagates_device_not_found() {
        let (_driver, adapter) = adapter_with(MockCameraDriver::failing_open());

        let err = adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap_err();

        assert!(matches!(err, CameraError::DeviceNotFound));
    }

    #[tokio::test]
    async fn test_flash_unsupported_is_not_a_failure() {
        let (driver, adapter) = adapter_with(MockCameraDriver::without_flash());

        let result = adapter
            .capture_photo(CaptureRequest::photo_defaults().with_flash(FlashMode::On))
            .await;

        assert!(result.is_ok(), "capability absence must not fail the capture");
        assert_eq!(driver.capture_count(), 1);
    }

    #[tokio::test]
    async fn test_each_capture_reopens_the_device() {
        // The teardown-after-capture design means the handle is re-acquired
        // lazily on the next request.
        let (driver, adapter) = adapter_with(MockCameraDriver::new());

        adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();
        adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();

        assert_eq!(driver.open_count(), 2);
        assert_eq!(driver.close_count(), 2);
    }

    #[tokio::test]
    async fn test_existing_handle_is_reused_and_facing_not_reapplied() {
        let (driver, adapter) = adapter_with(MockCameraDriver::new());
        driver.open(CameraFacing::Front).unwrap();

        // photo_defaults() asks for the back camera, but initialization is a
        // no-op on an open handle: no re-open, no facing switch.
        adapter
            .capture_photo(CaptureRequest::photo_defaults())
            .await
            .unwrap();

        assert_eq!(driver.open_count(), 1);
        assert_eq!(driver.facings(), vec![CameraFacing::Front]);
    }

    #[tokio::test]
    async fn test_cleanup_is_safe_with_no_open_handle() {
        let (driver, adapter) = adapter_with(MockCameraDriver::new());
        adapter.cleanup().await;
        adapter.cleanup().await;
        assert!(!driver.is_open());
    }

    #[tokio::test]
    async fn test_concurrent_captures_serialize_on_the_device() {
        let (driver, adapter) = adapter_with(MockCameraDriver::new());
        let adapter = Arc::new(adapter);

        let mut handles = Vec::new();
        for _ in 0..4 {
            let adapter = Arc::clone(&adapter);
            handles.push(tokio::spawn(async move {
                adapter
                    .capture_photo(CaptureRequest::photo_defaults())
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every capture ran the full open→capture→close cycle: interleaving
        // would have tripped the mock's already-open assertion.
        assert_eq!(driver.open_count(), 4);
        assert_eq!(driver.close_count(), 4);
        assert!(!driver.is_open());
    }
}
