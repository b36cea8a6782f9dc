//! # cam-core
//!
//! Shared library for Cam-Over-IP containing the JSON wire protocol, capture
//! domain types, and the error taxonomy.
//!
//! This crate is used by the server binary and by any future native client.
//! It has zero dependencies on OS APIs, async runtimes, or network sockets.
//!
//! # Architecture overview
//!
//! Cam-Over-IP exposes a single camera device over a persistent WebSocket
//! connection: remote clients send textual commands ("take a photo",
//! "enable/disable flash") and receive structured responses carrying image
//! bytes or error details.
//!
//! This crate (`cam-core`) is the shared foundation. It defines:
//!
//! - **`protocol`** – What travels over the wire. Inbound frames are a
//!   `{type, command}` JSON envelope decoded into a typed [`Command`];
//!   outbound frames are a typed [`Response`] serialized to a fixed-shape
//!   JSON object with image bytes carried as base64 text.
//!
//! - **`types`** – Capture configuration inputs: which sensor to use
//!   ([`CameraFacing`]), the flash behaviour ([`FlashMode`]), and the full
//!   per-capture parameter set ([`CaptureRequest`]).
//!
//! - **`error`** – The discriminated failure kinds ([`CameraError`] and
//!   [`DecodeError`]) so callers branch on kind rather than string-matching
//!   exception messages.

pub mod error;
pub mod protocol;
pub mod types;

// Re-export the most-used types at the crate root so callers can write
// `cam_core::Command` instead of `cam_core::protocol::command::Command`.
pub use error::{CameraError, DecodeError};
pub use protocol::command::{parse_command_frame, Command};
pub use protocol::response::{FlashStatus, Response};
pub use types::{CameraFacing, CaptureRequest, FlashMode};
