//! WebSocket server: accept loop and per-session command loop.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming TCP connections and upgrading them to WebSocket
//!    sessions on the fixed `/ws` path (any other path is rejected with
//!    HTTP 400 during the upgrade).
//! 3. Running one command loop per session: read a frame, decode it, execute
//!    it against the capture adapter or the native watcher, write exactly
//!    one response frame back.
//! 4. Registering/unregistering each connection in the registry, exactly
//!    once each.
//! 5. Gracefully shutting down when the `running` flag is cleared.
//!
//! # Concurrency
//!
//! Each session runs in its own Tokio task; the accept loop never blocks on
//! a slow client. Within one session the loop is strictly sequential — a
//! command fully completes (including a blocking capture or the bounded
//! native watch) before the next frame is read, so responses are emitted in
//! request order with no pipelining. Across sessions, capture commands
//! queue on the adapter's device mutex.
//!
//! # Failure policy
//!
//! Recoverable failures (undecodable frames, device errors, watch timeouts)
//! become `error` response frames and the loop continues. Only a
//! transport-level failure or an explicit close ends a session.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::handshake::server::{ErrorResponse, Request, Response as HandshakeResponse},
    tungstenite::http::StatusCode,
    tungstenite::{Error as WsError, Message as WsMessage},
    WebSocketStream,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use cam_core::{parse_command_frame, Response};

use crate::application::capture::CaptureAdapter;
use crate::application::dispatch::dispatch_command;
use crate::application::native::NativeCaptureWatcher;
use crate::domain::ServerConfig;
use crate::infrastructure::registry::{ConnectionEntry, ConnectionRegistry};

/// The single WebSocket endpoint path.
pub const WS_PATH: &str = "/ws";

/// Everything a session task needs, shared across all sessions.
#[derive(Clone)]
pub struct SessionDeps {
    pub adapter: Arc<CaptureAdapter>,
    pub watcher: Arc<NativeCaptureWatcher>,
    pub registry: Arc<ConnectionRegistry>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the main accept loop until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot be bound (e.g., the port is
/// already in use).
pub async fn run_server(
    config: ServerConfig,
    deps: SessionDeps,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind listener on {}", config.bind_addr))?;

    info!("camera command server listening on ws://{}{WS_PATH}", config.bind_addr);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // A short timeout on `accept()` lets the loop check the `running`
        // flag even when no clients are connecting.
        let accept_result = timeout(Duration::from_millis(200), listener.accept()).await;

        match accept_result {
            Ok(Ok((stream, peer_addr))) => {
                info!("new connection from {peer_addr}");
                let session_deps = deps.clone();
                tokio::spawn(async move {
                    handle_client_session(stream, peer_addr, session_deps).await;
                });
            }
            Ok(Err(e)) => {
                // Transient accept error; keep serving other clients.
                error!("accept error: {e}");
            }
            Err(_) => {
                // No connection in the last 200 ms; re-check the flag.
            }
        }
    }

    Ok(())
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Entry point for each per-session Tokio task. Wraps [`run_session`] and
/// logs the outcome so the session task itself never panics or propagates.
pub async fn handle_client_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    deps: SessionDeps,
) {
    match run_session(raw_stream, peer_addr, deps).await {
        Ok(()) => info!("session {peer_addr} closed normally"),
        Err(e) => warn!("session {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the complete lifecycle of one client session: handshake, registry
/// entry, command loop, and exactly-once unregistration.
async fn run_session(
    raw_stream: TcpStream,
    peer_addr: SocketAddr,
    deps: SessionDeps,
) -> anyhow::Result<()> {
    // Complete the WebSocket upgrade, rejecting any path other than /ws.
    let ws_stream = accept_hdr_async(raw_stream, enforce_ws_path)
        .await
        .with_context(|| format!("WebSocket handshake failed with {peer_addr}"))?;

    let connection_id = Uuid::new_v4().to_string();
    deps.registry.register(
        connection_id.clone(),
        ConnectionEntry {
            peer_addr,
            connected_at: Instant::now(),
        },
    );
    info!("session {connection_id} established from {peer_addr}");

    // The loop result is inspected only after the registry entry is gone, so
    // every exit path unregisters exactly once.
    let outcome = command_loop(ws_stream, &connection_id, &deps).await;

    let removed = deps.registry.unregister(&connection_id);
    debug!("session {connection_id} unregistered (removed={removed})");

    outcome
}

/// The per-connection state machine: awaiting frame → dispatching → awaiting
/// frame, looping until the peer closes or the transport fails.
async fn command_loop(
    mut ws_stream: WebSocketStream<TcpStream>,
    connection_id: &str,
    deps: &SessionDeps,
) -> anyhow::Result<()> {
    loop {
        let msg = match ws_stream.next().await {
            Some(Ok(msg)) => msg,
            Some(Err(WsError::ConnectionClosed | WsError::Protocol(_))) => {
                debug!("session {connection_id}: peer closed the stream");
                break;
            }
            Some(Err(e)) => {
                // Transport-level failure: fatal to this connection only.
                warn!("session {connection_id}: transport error: {e}");
                break;
            }
            None => {
                debug!("session {connection_id}: stream ended");
                break;
            }
        };

        match msg {
            WsMessage::Text(text) => {
                // Exactly one response per request frame, whatever happens.
                let response = match parse_command_frame(&text) {
                    Ok(command) => {
                        info!("session {connection_id}: dispatching {}", command.name());
                        dispatch_command(command, &deps.adapter, &deps.watcher).await
                    }
                    Err(err) => {
                        warn!("session {connection_id}: undecodable frame: {err}");
                        Response::error(err.to_string())
                    }
                };

                if let Err(e) = ws_stream.send(WsMessage::Text(response.to_frame())).await {
                    warn!("session {connection_id}: send failed: {e}");
                    break;
                }
            }

            WsMessage::Binary(_) => {
                // The protocol is JSON text frames only.
                warn!("session {connection_id}: unexpected binary frame (ignored)");
            }

            WsMessage::Ping(data) => {
                // tokio-tungstenite queues the Pong reply automatically.
                debug!("session {connection_id}: WebSocket ping ({} bytes)", data.len());
            }

            WsMessage::Pong(_) => {
                debug!("session {connection_id}: WebSocket pong received");
            }

            WsMessage::Close(_) => {
                debug!("session {connection_id}: Close frame received");
                // Acknowledge the close before tearing the session down; the
                // library tolerates this racing its own automatic reply.
                let _ = ws_stream.send(WsMessage::Close(None)).await;
                break;
            }

            WsMessage::Frame(_) => {
                debug!("session {connection_id}: raw frame (ignored)");
            }
        }
    }

    Ok(())
}

// ── Handshake helper ──────────────────────────────────────────────────────────

/// Upgrade callback: accept `/ws`, answer anything else with HTTP 400.
fn enforce_ws_path(
    request: &Request,
    response: HandshakeResponse,
) -> Result<HandshakeResponse, ErrorResponse> {
    let path = request.uri().path();
    if path == WS_PATH {
        return Ok(response);
    }

    debug!("rejecting upgrade on unexpected path {path}");
    let mut reject = ErrorResponse::new(Some(format!(
        "WebSocket endpoint is {WS_PATH}; nothing is served at {path}"
    )));
    *reject.status_mut() = StatusCode::BAD_REQUEST;
    Err(reject)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
