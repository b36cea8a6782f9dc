//! Inbound command frames.
//!
//! A request frame is a JSON object with two string fields:
//!
//! ```json
//! { "type": "command", "command": "TakePhoto" }
//! ```
//!
//! # Decoding rules
//!
//! - Field *names* are matched case-insensitively (`"Type"`, `"COMMAND"`,
//!   and `"type"` are all accepted). Field *values* are compared exactly.
//! - A frame that is not a JSON object, or whose fields are not strings,
//!   fails with [`DecodeError::InvalidJson`]. The session answers this with
//!   an `"Invalid JSON format"` error frame and stays usable.
//! - A well-formed envelope whose `type` is not `"command"`, or whose
//!   `command` names no known kind, decodes to [`Command::Unknown`]. The
//!   session answers this with an `"Unknown command"` error frame. The two
//!   cases are deliberately indistinguishable on the wire.
//!
//! Distinguishing the malformed case from the unknown case matters because
//! clients use the former to detect their own serialization bugs and the
//! latter to detect version skew against the server.

use serde_json::{Map, Value};

use crate::error::DecodeError;

/// A typed, immutable camera command decoded from one request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Capture a still image by driving the device directly.
    TakePhoto,
    /// Capture a still image via the externally installed camera app.
    TakePhotoNative,
    /// Apply flash-on and capture (flash state is only observable as a side
    /// effect of a capture; see the dispatch layer).
    FlashOn,
    /// Apply flash-off and capture.
    FlashOff,
    /// Envelope parsed but named no known command (or wrong `type`).
    Unknown,
}

impl Command {
    /// Short name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Command::TakePhoto => "TakePhoto",
            Command::TakePhotoNative => "TakePhotoNative",
            Command::FlashOn => "FlashOn",
            Command::FlashOff => "FlashOff",
            Command::Unknown => "Unknown",
        }
    }
}

/// Decodes one inbound text frame into a [`Command`].
///
/// # Errors
///
/// Returns [`DecodeError::InvalidJson`] when the frame is not a JSON object
/// with string-typed `type`/`command` fields. Envelopes that are structurally
/// fine but semantically unknown decode to `Ok(Command::Unknown)` instead.
pub fn parse_command_frame(text: &str) -> Result<Command, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(|_| DecodeError::InvalidJson)?;

    let Value::Object(fields) = value else {
        return Err(DecodeError::InvalidJson);
    };

    let envelope_type = match field_ci(&fields, "type") {
        Some(Value::String(s)) => s.as_str(),
        // A present-but-non-string field is a shape violation.
        Some(_) => return Err(DecodeError::InvalidJson),
        None => return Ok(Command::Unknown),
    };

    let command = match field_ci(&fields, "command") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(DecodeError::InvalidJson),
        None => return Ok(Command::Unknown),
    };

    // `type` must equal "command" or the envelope is rejected regardless of
    // what `command` says.
    if envelope_type != "command" {
        return Ok(Command::Unknown);
    }

    Ok(match command {
        "TakePhoto" => Command::TakePhoto,
        "TakePhotoNative" => Command::TakePhotoNative,
        "FlashOn" => Command::FlashOn,
        "FlashOff" => Command::FlashOff,
        _ => Command::Unknown,
    })
}

/// Case-insensitive field lookup; first match wins.
fn field_ci<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_take_photo() {
        let cmd = parse_command_frame(r#"{"type":"command","command":"TakePhoto"}"#).unwrap();
        assert_eq!(cmd, Command::TakePhoto);
    }

    #[test]
    fn test_parse_take_photo_native() {
        let cmd =
            parse_command_frame(r#"{"type":"command","command":"TakePhotoNative"}"#).unwrap();
        assert_eq!(cmd, Command::TakePhotoNative);
    }

    #[test]
    fn test_parse_flash_on_and_off() {
        assert_eq!(
            parse_command_frame(r#"{"type":"command","command":"FlashOn"}"#).unwrap(),
            Command::FlashOn
        );
        assert_eq!(
            parse_command_frame(r#"{"type":"command","command":"FlashOff"}"#).unwrap(),
            Command::FlashOff
        );
    }

    #[test]
    fn test_field_names_match_case_insensitively() {
        // Mixed-case field names must decode identically.
        let cmd = parse_command_frame(r#"{"Type":"command","COMMAND":"TakePhoto"}"#).unwrap();
        assert_eq!(cmd, Command::TakePhoto);
    }

    #[test]
    fn test_field_values_are_compared_exactly() {
        // Value comparison is exact: "takephoto" is not a known command.
        let cmd = parse_command_frame(r#"{"type":"command","command":"takephoto"}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_unrecognized_command_decodes_to_unknown() {
        let cmd = parse_command_frame(r#"{"type":"command","command":"Frobnicate"}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_wrong_type_is_unknown_regardless_of_command() {
        // A valid command name under the wrong envelope type is still rejected.
        let cmd = parse_command_frame(r#"{"type":"query","command":"TakePhoto"}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_missing_command_field_is_unknown() {
        let cmd = parse_command_frame(r#"{"type":"command"}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_missing_type_field_is_unknown() {
        let cmd = parse_command_frame(r#"{"command":"TakePhoto"}"#).unwrap();
        assert_eq!(cmd, Command::Unknown);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let cmd = parse_command_frame(
            r#"{"type":"command","command":"FlashOn","requestId":"abc123"}"#,
        )
        .unwrap();
        assert_eq!(cmd, Command::FlashOn);
    }

    #[test]
    fn test_malformed_json_is_a_decode_error() {
        let err = parse_command_frame(r#"{"type":"command","#).unwrap_err();
        assert_eq!(err, DecodeError::InvalidJson);
    }

    #[test]
    fn test_non_object_payload_is_a_decode_error() {
        // Valid JSON, wrong shape: a bare scalar cannot be an envelope.
        assert_eq!(
            parse_command_frame("42").unwrap_err(),
            DecodeError::InvalidJson
        );
        assert_eq!(
            parse_command_frame(r#"["type","command"]"#).unwrap_err(),
            DecodeError::InvalidJson
        );
    }

    #[test]
    fn test_non_string_field_value_is_a_decode_error() {
        assert_eq!(
            parse_command_frame(r#"{"type":"command","command":7}"#).unwrap_err(),
            DecodeError::InvalidJson
        );
        assert_eq!(
            parse_command_frame(r#"{"type":true,"command":"TakePhoto"}"#).unwrap_err(),
            DecodeError::InvalidJson
        );
    }

    #[test]
    fn test_command_name_for_logging() {
        assert_eq!(Command::TakePhotoNative.name(), "TakePhotoNative");
        assert_eq!(Command::Unknown.name(), "Unknown");
    }
}
