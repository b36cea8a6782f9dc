//! Cam-Over-IP server — entry point.
//!
//! This binary accepts WebSocket connections on a fixed `/ws` path and lets
//! clients drive the host's camera with JSON text commands:
//!
//! ```text
//! → {"type":"command","command":"TakePhoto"}
//! ← {"type":"photo","filePath":"...","imageData":"<base64>"}
//! ```
//!
//! # Usage
//!
//! ```text
//! cam-server [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>              Listen address [default: 0.0.0.0]
//!   --port <PORT>              Listen port [default: 8080]
//!   --pictures-dir <DIR>       Where captured photos land [default: platform pictures dir]
//!   --camera-subdir <NAME>     Sub-directory the camera app writes into [default: Camera]
//!   --watch-timeout <SECS>     Native-capture detection window [default: 60]
//!   --poll-interval-ms <MS>    Stabilization poll cadence [default: 500]
//!   --poll-attempts <N>        Stabilization attempt budget [default: 20]
//!   --capture-command <TMPL>   Still-capture command template
//!   --capture-app <CMD>        Command that opens the native camera app
//! ```
//!
//! Every option can also be set through a `CAM_*` environment variable; CLI
//! arguments take precedence when both are present.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use directories::UserDirs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cam_server::application::capture::{CameraDriver, CaptureAdapter};
use cam_server::application::native::{CaptureIntentLauncher, NativeCaptureWatcher};
use cam_server::domain::ServerConfig;
use cam_server::infrastructure::device::shell::ShellCameraDriver;
use cam_server::infrastructure::launcher::system::SystemCaptureLauncher;
use cam_server::infrastructure::{run_server, ConnectionRegistry, SessionDeps};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Cam-Over-IP camera command server.
#[derive(Debug, Parser)]
#[command(
    name = "cam-server",
    about = "Expose a camera device over a persistent WebSocket connection",
    version
)]
struct Cli {
    /// IP address to bind the WebSocket server to.
    ///
    /// Use `0.0.0.0` to accept connections from any interface, or
    /// `127.0.0.1` for local-only access.
    #[arg(long, default_value = "0.0.0.0", env = "CAM_BIND")]
    bind: String,

    /// TCP port to listen on. Clients connect to `ws://host:PORT/ws`.
    #[arg(long, default_value_t = 8080, env = "CAM_PORT")]
    port: u16,

    /// Directory where captured photos are written and watched for.
    ///
    /// Defaults to the platform pictures directory (e.g. `~/Pictures`), with
    /// the system temp directory as a last resort on headless hosts.
    #[arg(long, env = "CAM_PICTURES_DIR")]
    pictures_dir: Option<PathBuf>,

    /// Sub-directory of the pictures directory that the native camera app
    /// writes into. Created on demand.
    #[arg(long, default_value = "Camera", env = "CAM_CAMERA_SUBDIR")]
    camera_subdir: String,

    /// How long to wait for the native camera app to create a new photo,
    /// in seconds.
    #[arg(long, default_value_t = 60, env = "CAM_WATCH_TIMEOUT")]
    watch_timeout: u64,

    /// Delay between size samples when waiting for a photo file to finish
    /// being written, in milliseconds.
    #[arg(long, default_value_t = 500, env = "CAM_POLL_INTERVAL_MS")]
    poll_interval_ms: u64,

    /// How many size samples to take before giving up on a photo file.
    #[arg(long, default_value_t = 20, env = "CAM_POLL_ATTEMPTS")]
    poll_attempts: u32,

    /// Still-capture command template; `{width}`, `{height}`, `{output}`,
    /// and `{facing}` are substituted per capture.
    #[arg(
        long,
        default_value = "libcamera-still --width {width} --height {height} --output {output} --nopreview",
        env = "CAM_CAPTURE_COMMAND"
    )]
    capture_command: String,

    /// Command that opens the host's native camera application.
    #[arg(long, default_value = "cheese", env = "CAM_CAPTURE_APP")]
    capture_app: String,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` and `--port` do not form a valid socket
    /// address.
    fn into_server_config(self) -> anyhow::Result<ServerConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.bind, self.port))?;

        Ok(ServerConfig {
            bind_addr,
            pictures_dir: self.pictures_dir.unwrap_or_else(default_pictures_dir),
            camera_subdir: self.camera_subdir,
            watch_timeout: Duration::from_secs(self.watch_timeout),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_attempts: self.poll_attempts,
        })
    }
}

/// Platform pictures directory, falling back to the temp directory on
/// headless hosts without user directories.
fn default_pictures_dir() -> PathBuf {
    if let Some(dir) = UserDirs::new().and_then(|dirs| dirs.picture_dir().map(PathBuf::from)) {
        return dir;
    }
    warn!("no platform pictures directory; falling back to the temp directory");
    std::env::temp_dir().join("cam-over-ip")
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging. Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let capture_command = cli.capture_command.clone();
    let capture_app = cli.capture_app.clone();
    let config = cli.into_server_config()?;

    info!(
        "cam-server starting — bind={}, pictures={}",
        config.bind_addr,
        config.pictures_dir.display()
    );

    // Wire the application layer to the real driver and launcher.
    let driver: Arc<dyn CameraDriver> = Arc::new(ShellCameraDriver::new(capture_command));
    let launcher: Arc<dyn CaptureIntentLauncher> =
        Arc::new(SystemCaptureLauncher::new(capture_app));

    let deps = SessionDeps {
        adapter: Arc::new(CaptureAdapter::new(driver, config.pictures_dir.clone())),
        watcher: Arc::new(NativeCaptureWatcher::new(
            launcher,
            config.watch_dir(),
            config.watch_timeout,
            config.poll_interval,
            config.poll_attempts,
        )),
        registry: Arc::new(ConnectionRegistry::new()),
    };

    // Graceful shutdown: Ctrl+C clears the flag, the accept loop checks it
    // every 200 ms and exits cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, deps, running).await?;

    info!("cam-server stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
