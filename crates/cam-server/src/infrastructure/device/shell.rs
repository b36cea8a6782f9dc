//! Shell-command camera driver.
//!
//! Drives whatever still-capture tool is installed on the host
//! (`libcamera-still`, `fswebcam`, `ffmpeg`, ...) through a configurable
//! command template. This keeps the server free of per-vendor SDK bindings:
//! the capture-device driver is an external collaborator, and the template
//! is the contract with it.
//!
//! # Command template
//!
//! The template is expanded per capture with three placeholders:
//!
//! ```text
//! libcamera-still --width {width} --height {height} --output {output} --nopreview
//! ```
//!
//! `{facing}` is also substituted (`back`/`front`) for tools that select a
//! sensor by name. The expanded command runs under `sh -c`; a non-zero exit
//! status is a capture failure carrying the tool's stderr.
//!
//! # Flash
//!
//! Command-line capture tools expose no portable flash control, so
//! `configure_flash` reports [`CameraError::FlashUnsupported`]; the adapter
//! logs a warning and captures without flash.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use cam_core::{CameraError, CameraFacing, FlashMode};

use crate::application::capture::CameraDriver;

/// The open-handle state: which sensor the capture command should address.
#[derive(Debug, Clone, Copy)]
struct ShellHandle {
    facing: CameraFacing,
}

/// A [`CameraDriver`] that shells out to a configurable capture command.
pub struct ShellCameraDriver {
    capture_command: String,
    handle: Mutex<Option<ShellHandle>>,
}

impl ShellCameraDriver {
    pub fn new(capture_command: String) -> Self {
        Self {
            capture_command,
            handle: Mutex::new(None),
        }
    }

    fn expand_template(&self, facing: CameraFacing, width: u32, height: u32, output: &str) -> String {
        let facing = match facing {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        };
        self.capture_command
            .replace("{width}", &width.to_string())
            .replace("{height}", &height.to_string())
            .replace("{output}", output)
            .replace("{facing}", facing)
    }
}

impl CameraDriver for ShellCameraDriver {
    fn open(&self, facing: CameraFacing) -> Result<(), CameraError> {
        let mut handle = self.handle.lock().expect("driver mutex poisoned");
        if handle.is_some() {
            return Err(CameraError::Driver("device already open".to_string()));
        }
        *handle = Some(ShellHandle { facing });
        debug!("shell driver opened ({facing:?})");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.lock().expect("driver mutex poisoned").is_some()
    }

    fn configure_flash(&self, _mode: FlashMode) -> Result<(), CameraError> {
        if !self.is_open() {
            return Err(CameraError::Driver(
                "configure_flash with no open device".to_string(),
            ));
        }
        // No portable flash control in command-line capture tools.
        Err(CameraError::FlashUnsupported)
    }

    fn capture_still(&self, width: u32, height: u32) -> Result<Vec<u8>, CameraError> {
        let facing = {
            let handle = self.handle.lock().expect("driver mutex poisoned");
            handle
                .as_ref()
                .ok_or_else(|| {
                    CameraError::Driver("capture_still with no open device".to_string())
                })?
                .facing
        };

        let output_path: PathBuf =
            std::env::temp_dir().join(format!("cam_capture_{}.jpg", Uuid::new_v4().simple()));
        let output_str = output_path.display().to_string();
        let command_line = self.expand_template(facing, width, height, &output_str);
        debug!("running capture command: {command_line}");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command_line)
            .output()
            .map_err(|err| CameraError::CaptureFailed(format!("spawn failed: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_file(&output_path);
            return Err(CameraError::CaptureFailed(format!(
                "capture command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let bytes = std::fs::read(&output_path)
            .map_err(|err| CameraError::CaptureFailed(format!("no capture output: {err}")))?;
        let _ = std::fs::remove_file(&output_path);

        Ok(bytes)
    }

    fn close(&self) {
        let mut handle = self.handle.lock().expect("driver mutex poisoned");
        if handle.take().is_some() {
            debug!("shell driver closed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
