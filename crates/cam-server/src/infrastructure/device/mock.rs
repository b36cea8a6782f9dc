//! Mock camera driver for unit testing.
//!
//! # Why a mock driver?
//!
//! The real driver ([`super::shell::ShellCameraDriver`]) spawns an external
//! capture process that:
//!
//! - Requires a physical camera attached to the test machine.
//! - Takes hundreds of milliseconds per frame.
//! - Cannot be made to fail on demand from Rust test code.
//!
//! The `MockCameraDriver` replaces all of that with in-memory recording.
//! Every call is counted or pushed into a `Mutex<Vec<...>>` so assertions
//! can inspect exactly what the adapter did and in what order.
//!
//! # Failure switches
//!
//! The constructors `failing_open`, `failing_capture`, and `without_flash`
//! configure the failure behaviour before the driver is shared, mirroring
//! how callers exercise error-handling paths without a broken device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use cam_core::{CameraError, CameraFacing, FlashMode};

use crate::application::capture::CameraDriver;

/// A driver that records all calls without touching any hardware.
pub struct MockCameraDriver {
    /// Records each facing passed to `open`.
    opens: Mutex<Vec<CameraFacing>>,
    /// Records each mode passed to `configure_flash`.
    flash_modes: Mutex<Vec<FlashMode>>,
    /// Records each (width, height) passed to `capture_still`.
    captures: Mutex<Vec<(u32, u32)>>,
    close_calls: AtomicUsize,
    open: AtomicBool,
    /// Bytes returned by `capture_still`.
    image: Vec<u8>,
    fail_open: bool,
    fail_capture: bool,
    flash_unsupported: bool,
}

impl MockCameraDriver {
    /// A well-behaved device returning a small fixed image.
    pub fn new() -> Self {
        Self::with_image(b"mock-image-bytes".to_vec())
    }

    /// A well-behaved device returning the given bytes from every capture.
    pub fn with_image(image: Vec<u8>) -> Self {
        Self {
            opens: Mutex::new(Vec::new()),
            flash_modes: Mutex::new(Vec::new()),
            captures: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
            open: AtomicBool::new(false),
            image,
            fail_open: false,
            fail_capture: false,
            flash_unsupported: false,
        }
    }

    /// A device that cannot be found during initialization.
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::new()
        }
    }

    /// A device that opens fine but fails every capture.
    pub fn failing_capture() -> Self {
        Self {
            fail_capture: true,
            ..Self::new()
        }
    }

    /// A device with no flash capability.
    pub fn without_flash() -> Self {
        Self {
            flash_unsupported: true,
            ..Self::new()
        }
    }

    pub fn open_count(&self) -> usize {
        self.opens.lock().unwrap().len()
    }

    pub fn capture_count(&self) -> usize {
        self.captures.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn flash_modes(&self) -> Vec<FlashMode> {
        self.flash_modes.lock().unwrap().clone()
    }

    pub fn facings(&self) -> Vec<CameraFacing> {
        self.opens.lock().unwrap().clone()
    }
}

impl Default for MockCameraDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDriver for MockCameraDriver {
    fn open(&self, facing: CameraFacing) -> Result<(), CameraError> {
        if self.fail_open {
            return Err(CameraError::DeviceNotFound);
        }
        if self.open.swap(true, Ordering::SeqCst) {
            // The adapter's mutex and idempotent initialize make this
            // unreachable; reaching it means the invariant broke.
            return Err(CameraError::Driver("device already open".to_string()));
        }
        self.opens.lock().unwrap().push(facing);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn configure_flash(&self, mode: FlashMode) -> Result<(), CameraError> {
        if !self.is_open() {
            return Err(CameraError::Driver(
                "configure_flash with no open device".to_string(),
            ));
        }
        if self.flash_unsupported {
            return Err(CameraError::FlashUnsupported);
        }
        self.flash_modes.lock().unwrap().push(mode);
        Ok(())
    }

    fn capture_still(&self, width: u32, height: u32) -> Result<Vec<u8>, CameraError> {
        if !self.is_open() {
            return Err(CameraError::Driver(
                "capture_still with no open device".to_string(),
            ));
        }
        if self.fail_capture {
            return Err(CameraError::CaptureFailed("mock capture failure".to_string()));
        }
        self.captures.lock().unwrap().push((width, height));
        Ok(self.image.clone())
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
