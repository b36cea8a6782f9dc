//! The JSON wire protocol.
//!
//! One JSON object per WebSocket text frame, in both directions:
//!
//! ```text
//! Client → Server: {"type":"command","command":"TakePhoto"}   → Command
//! Server → Client: Response → {"type":"photo","filePath":...,"imageData":...}
//! ```

pub mod command;
pub mod response;
