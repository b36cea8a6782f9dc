//! Capture-device driver implementations.
//!
//! The [`crate::application::capture::CameraDriver`] trait is implemented by
//! a real driver that shells out to a still-capture tool, and by an
//! in-memory mock for tests and embedding.

pub mod mock;
pub mod shell;
