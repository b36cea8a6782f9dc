//! System capture-app launcher.
//!
//! Renders the "open default handler for the capture intent" primitive as a
//! configurable launch command run under `sh -c` (e.g. `cheese`,
//! `xdg-open camera:`, or a vendor tool). Launch success means the OS
//! started the process; what the application does afterwards is only
//! observable through the filesystem watcher.

use std::process::{Command, Stdio};
use std::sync::Mutex;

use tracing::debug;

use cam_core::CameraError;

use crate::application::native::CaptureIntentLauncher;

pub struct SystemCaptureLauncher {
    launch_command: String,
    /// The last spawned child, kept so `bring_to_front` has something to
    /// reason about and so the process is not orphaned silently on drop.
    child: Mutex<Option<std::process::Child>>,
}

impl SystemCaptureLauncher {
    pub fn new(launch_command: String) -> Self {
        Self {
            launch_command,
            child: Mutex::new(None),
        }
    }
}

impl CaptureIntentLauncher for SystemCaptureLauncher {
    fn launch_capture_app(&self) -> Result<(), CameraError> {
        debug!("launching capture app: {}", self.launch_command);
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&self.launch_command)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| CameraError::LaunchFailed(err.to_string()))?;

        let mut child = self.child.lock().expect("launcher mutex poisoned");
        *child = Some(spawned);
        Ok(())
    }

    fn bring_to_front(&self) -> Result<(), CameraError> {
        // There is no portable focus primitive; window managers raise a
        // freshly spawned application themselves. Report an error only when
        // the app is known to have already exited, so callers can log it.
        let mut child = self.child.lock().expect("launcher mutex poisoned");
        match child.as_mut().map(|c| c.try_wait()) {
            Some(Ok(Some(status))) => Err(CameraError::LaunchFailed(format!(
                "capture app exited before focus ({status})"
            ))),
            _ => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
