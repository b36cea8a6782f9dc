//! Error taxonomy for camera operations.
//!
//! Every failure kind a command can surface is a distinct enum variant so
//! that callers branch on kind rather than string-matching messages. The
//! `Display` strings double as the user-visible `message` field of an error
//! response frame.
//!
//! Transport-level failures (a broken WebSocket stream) are deliberately NOT
//! part of this taxonomy: they are fatal to the connection and handled by the
//! session loop, whereas every [`CameraError`] is recoverable and converted
//! into exactly one error response at the dispatch boundary.

use thiserror::Error;

/// A recoverable failure while executing a camera command.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device matched the requested facing during initialization.
    #[error("camera device not found")]
    DeviceNotFound,

    /// The driver rejected an initialize/configure call.
    #[error("camera driver error: {0}")]
    Driver(String),

    /// The open device has no flash capability.
    ///
    /// Callers treat this as a warning, not a failure: capability absence
    /// must never fail a capture.
    #[error("flash not supported by this device")]
    FlashUnsupported,

    /// The driver failed to produce a still image.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The OS refused to start the external capture application.
    #[error("failed to launch capture app: {0}")]
    LaunchFailed(String),

    /// The directory-observation window elapsed with no matching file.
    #[error("no new photo detected")]
    WatchTimeout,

    /// A detected file's size was still changing when the stabilization
    /// attempt budget ran out.
    #[error("photo file did not stabilize before the read deadline")]
    StabilizeTimeout,

    /// A filesystem operation failed and retries were exhausted.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A failure to decode an inbound frame into a [`crate::Command`].
///
/// Structurally malformed payloads are the only decode *error*; an envelope
/// that parses but names no known command decodes to `Command::Unknown`
/// instead, because the session must answer it with a different message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame was not a well-formed JSON object of the expected shape.
    #[error("Invalid JSON format")]
    InvalidJson,
}
