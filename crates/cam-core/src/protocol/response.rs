//! Outbound response frames.
//!
//! Every request frame is answered with exactly one response frame, one of
//! three fixed shapes:
//!
//! ```json
//! {"type":"photo","filePath":"/data/pics/cam_1691....jpg","imageData":"<base64>"}
//! {"type":"flash","status":"on"}
//! {"type":"error","message":"Unknown command"}
//! ```
//!
//! Raw image bytes are not valid inside a JSON string, so `imageData` carries
//! them as standard base64 (RFC 4648). Serde's `#[serde(tag = "type")]`
//! attribute produces the `"type"` discriminant field automatically.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Flash state reported by a `flash` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashStatus {
    On,
    Off,
}

/// One response frame, serialized as a fixed-shape JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    /// A successful capture: where the file landed and its full contents.
    #[serde(rename_all = "camelCase")]
    Photo {
        /// Absolute path of the image file on the server.
        file_path: String,
        /// The raw image bytes, base64-encoded.
        image_data: String,
    },

    /// Acknowledgment of a flash toggle command.
    ///
    /// Sent regardless of whether the underlying capture succeeded; see the
    /// dispatch layer for why.
    Flash { status: FlashStatus },

    /// A recoverable per-command failure.
    Error { message: String },
}

impl Response {
    /// Builds a `photo` response from a capture result, encoding the bytes.
    pub fn photo(file_path: &Path, image_bytes: &[u8]) -> Self {
        Response::Photo {
            file_path: file_path.display().to_string(),
            image_data: BASE64.encode(image_bytes),
        }
    }

    /// Builds a `flash` response for the given status.
    pub fn flash(status: FlashStatus) -> Self {
        Response::Flash { status }
    }

    /// Builds an `error` response carrying a user-visible message.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    /// Serializes this response to the JSON text of one frame.
    ///
    /// Serialization of these fixed shapes cannot fail in practice; the
    /// fallback keeps the one-response-per-request contract even if it ever
    /// does.
    pub fn to_frame(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"internal serialization error"}"#.into())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
