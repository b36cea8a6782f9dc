//! Infrastructure layer: WebSocket server, connection registry, and the
//! driver/launcher implementations behind the application-layer traits.

pub mod device;
pub mod launcher;
pub mod registry;
pub mod ws_server;

pub use registry::{ConnectionEntry, ConnectionRegistry};
pub use ws_server::{handle_client_session, run_server, SessionDeps, WS_PATH};
