//! ConnectionRegistry: process-wide table of live connections.
//!
//! Purely bookkeeping: entries are added on accept and removed on
//! close/error, and no business logic ever iterates the table. It exists so
//! operators can see who is connected and so teardown can be verified in
//! tests. The registry is owned by the server instance and handed to session
//! tasks via `Arc` — no ambient global.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

/// Bookkeeping record for one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    pub peer_addr: SocketAddr,
    pub connected_at: Instant,
}

/// In-memory table mapping connection id → entry.
///
/// A `std::sync::Mutex` is sufficient here: every operation is a short
/// HashMap access with no await points inside the critical section.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<String, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly accepted connection.
    pub fn register(&self, id: String, entry: ConnectionEntry) {
        self.connections
            .lock()
            .expect("registry mutex poisoned")
            .insert(id, entry);
    }

    /// Removes a connection; returns `false` when the id was already gone,
    /// which lets callers assert the exactly-once teardown contract.
    pub fn unregister(&self, id: &str) -> bool {
        self.connections
            .lock()
            .expect("registry mutex poisoned")
            .remove(id)
            .is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections
            .lock()
            .expect("registry mutex poisoned")
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections
            .lock()
            .expect("registry mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
