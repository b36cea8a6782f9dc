//! Command dispatch: one typed command in, exactly one response out.
//!
//! This is the boundary where every recoverable failure is converted into an
//! `error` response frame. Nothing below this layer can terminate a session;
//! only transport-level failures (handled in the infrastructure layer) do.

use std::path::PathBuf;

use tracing::warn;

use cam_core::{CameraError, CaptureRequest, Command, FlashMode, FlashStatus, Response};

use crate::application::capture::CaptureAdapter;
use crate::application::native::NativeCaptureWatcher;

/// Executes one command and produces its single response.
///
/// Infallible by contract: error kinds become `error` frames, and the flash
/// toggles answer with their requested status even when the underlying
/// capture failed (flash state is only observable as a side effect of an
/// actual capture in this design — there is no capture-free flash toggle).
pub async fn dispatch_command(
    command: Command,
    adapter: &CaptureAdapter,
    watcher: &NativeCaptureWatcher,
) -> Response {
    match command {
        Command::TakePhoto => {
            photo_response(adapter.capture_photo(CaptureRequest::photo_defaults()).await)
        }
        Command::TakePhotoNative => photo_response(watcher.capture_via_native_app().await),
        Command::FlashOn => flash_response(adapter, FlashMode::On, FlashStatus::On).await,
        Command::FlashOff => flash_response(adapter, FlashMode::Off, FlashStatus::Off).await,
        Command::Unknown => Response::error("Unknown command"),
    }
}

fn photo_response(result: Result<(PathBuf, Vec<u8>), CameraError>) -> Response {
    match result {
        Ok((file_path, image_bytes)) => Response::photo(&file_path, &image_bytes),
        Err(err) => {
            warn!("capture command failed: {err}");
            Response::error(err.to_string())
        }
    }
}

/// Applies a flash mode by running a capture with it, then acknowledges the
/// requested status unconditionally.
async fn flash_response(
    adapter: &CaptureAdapter,
    mode: FlashMode,
    status: FlashStatus,
) -> Response {
    let request = CaptureRequest::photo_defaults().with_flash(mode);
    if let Err(err) = adapter.capture_photo(request).await {
        // The status is still reported: the client asked for a flash state,
        // not for a photo.
        warn!("flash toggle capture failed (status reported anyway): {err}");
    }
    Response::flash(status)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
