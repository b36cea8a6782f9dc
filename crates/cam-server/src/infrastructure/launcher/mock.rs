//! Mock capture-intent launcher for unit testing.
//!
//! Records launch/focus calls without starting any process, with failure
//! switches configured at construction (the same pattern as
//! [`crate::infrastructure::device::mock::MockCameraDriver`]).

use std::sync::atomic::{AtomicUsize, Ordering};

use cam_core::CameraError;

use crate::application::native::CaptureIntentLauncher;

pub struct MockCaptureLauncher {
    launches: AtomicUsize,
    focuses: AtomicUsize,
    fail_launch: bool,
    fail_focus: bool,
}

impl MockCaptureLauncher {
    /// A launcher where everything succeeds.
    pub fn new() -> Self {
        Self {
            launches: AtomicUsize::new(0),
            focuses: AtomicUsize::new(0),
            fail_launch: false,
            fail_focus: false,
        }
    }

    /// A launcher the OS refuses to start.
    pub fn failing_launch() -> Self {
        Self {
            fail_launch: true,
            ..Self::new()
        }
    }

    /// A launcher that starts but cannot be focused.
    pub fn failing_focus() -> Self {
        Self {
            fail_focus: true,
            ..Self::new()
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn focus_count(&self) -> usize {
        self.focuses.load(Ordering::SeqCst)
    }
}

impl Default for MockCaptureLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureIntentLauncher for MockCaptureLauncher {
    fn launch_capture_app(&self) -> Result<(), CameraError> {
        if self.fail_launch {
            return Err(CameraError::LaunchFailed("mock launch refusal".to_string()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn bring_to_front(&self) -> Result<(), CameraError> {
        if self.fail_focus {
            return Err(CameraError::LaunchFailed("mock focus failure".to_string()));
        }
        self.focuses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
