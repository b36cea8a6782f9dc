//! Capture configuration types.
//!
//! These are inputs to a single capture operation, not persisted state.

/// Flash behaviour applied to the device before a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashMode {
    /// Let the driver decide based on ambient light.
    Auto,
    /// Force the flash on.
    On,
    /// Force the flash off.
    Off,
}

/// Which physical camera sensor to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraFacing {
    Back,
    Front,
}

/// Default capture width in pixels for the `TakePhoto` command.
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1920;

/// Default capture height in pixels for the `TakePhoto` command.
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 1080;

/// The full parameter set for one still-image capture.
///
/// `TakePhoto` and the flash toggle commands all use [`CaptureRequest::photo_defaults`]
/// (back camera, 1920×1080); the flash toggles override only the flash mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub facing: CameraFacing,
    pub flash: FlashMode,
    pub width: u32,
    pub height: u32,
}

impl CaptureRequest {
    /// The fixed defaults used by the `TakePhoto` command: flash ON, back
    /// camera, 1920×1080.
    pub fn photo_defaults() -> Self {
        Self {
            facing: CameraFacing::Back,
            flash: FlashMode::On,
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
        }
    }

    /// Returns a copy of this request with a different flash mode.
    pub fn with_flash(self, flash: FlashMode) -> Self {
        Self { flash, ..self }
    }
}
