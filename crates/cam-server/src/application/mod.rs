//! Application layer: capture use cases and command dispatch.
//!
//! Collaborator traits ([`capture::CameraDriver`],
//! [`native::CaptureIntentLauncher`]) are defined here; their real and mock
//! implementations live in the infrastructure layer.

pub mod capture;
pub mod dispatch;
pub mod native;

pub use capture::{CameraDriver, CaptureAdapter};
pub use dispatch::dispatch_command;
pub use native::{CaptureIntentLauncher, NativeCaptureWatcher};
