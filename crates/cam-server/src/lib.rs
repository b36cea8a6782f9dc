//! cam-server library crate.
//!
//! Exposes a single camera device over a persistent WebSocket connection:
//! clients send JSON command frames and receive exactly one JSON response
//! frame per command.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Client (JSON over WebSocket, /ws)
//!         ↕
//! [cam-server]
//!   ├── domain/           ServerConfig (pure types, no I/O)
//!   ├── application/      CaptureAdapter, NativeCaptureWatcher, dispatch
//!   └── infrastructure/
//!         ├── ws_server/  Accept loop + per-session command loop
//!         ├── registry/   Connection bookkeeping table
//!         ├── device/     CameraDriver implementations (shell + mock)
//!         └── launcher/   CaptureIntentLauncher implementations
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no external dependencies (no I/O, no async, no frameworks).
//! - `application` depends on `domain` and `cam-core`; it defines the
//!   collaborator traits and owns all capture/watch/dispatch semantics.
//! - `infrastructure` depends on everything plus `tokio`, `tungstenite`,
//!   and `notify`.
//!
//! This split keeps the command semantics testable without a real network,
//! camera, or camera application: tests drive the application layer with the
//! in-memory driver and launcher from `infrastructure::{device,launcher}::mock`.

pub mod application;
pub mod domain;
pub mod infrastructure;
