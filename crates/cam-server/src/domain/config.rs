//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for all runtime settings.
//! It can be constructed from CLI arguments (preferred for production) or
//! from defaults (useful for local development and tests).
//!
//! # Design rationale
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! variable reads inside the domain) makes the server easy to embed in tests.
//! The binary entry point is responsible for populating the struct from CLI
//! args or environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// All runtime configuration for the camera command server.
///
/// Build this struct once at startup and share it across session tasks.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address and port the WebSocket server binds to.
    pub bind_addr: SocketAddr,

    /// Root pictures directory where captured images land.
    ///
    /// Production resolves this to the platform pictures location; tests
    /// point it at a temporary directory.
    pub pictures_dir: PathBuf,

    /// Well-known sub-directory of `pictures_dir` that the external camera
    /// application writes into. Created on demand before watching.
    pub camera_subdir: String,

    /// Bounded wait for the native-capture directory observation.
    pub watch_timeout: Duration,

    /// Delay between stabilization-poll attempts on a detected file.
    pub poll_interval: Duration,

    /// Stabilization-poll attempt budget.
    pub poll_attempts: u32,
}

impl ServerConfig {
    /// The directory the native-capture watcher observes.
    pub fn watch_dir(&self) -> PathBuf {
        self.pictures_dir.join(&self.camera_subdir)
    }
}

impl Default for ServerConfig {
    /// Returns a `ServerConfig` suitable for local development and tests.
    ///
    /// | Field          | Default                     |
    /// |----------------|-----------------------------|
    /// | bind_addr      | `0.0.0.0:8080`              |
    /// | pictures_dir   | `<tmp>/cam-over-ip`         |
    /// | camera_subdir  | `Camera`                    |
    /// | watch_timeout  | 60 seconds                  |
    /// | poll_interval  | 500 milliseconds            |
    /// | poll_attempts  | 20                          |
    fn default() -> Self {
        Self {
            // Compile-time-known valid socket address string.
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            pictures_dir: std::env::temp_dir().join("cam-over-ip"),
            camera_subdir: "Camera".to_string(),
            watch_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
            poll_attempts: 20,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
