//! Capture-intent launcher implementations.
//!
//! The [`crate::application::native::CaptureIntentLauncher`] trait is
//! implemented by a real launcher that spawns the host's camera application,
//! and by an in-memory mock for tests.

pub mod mock;
pub mod system;
