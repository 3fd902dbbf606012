use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

/// What a peer is doing in its room.
///
/// The credential lives with the host role and the room binding with the
/// viewer role, so a session cannot carry the wrong one.
#[derive(Debug, Clone)]
pub enum PeerRole {
    /// Owns a room; `credential` is compared verbatim on join attempts.
    Host { credential: String },
    /// Bound to the host it joined. The binding is validated once, at
    /// join time; it is not revisited if the host later disconnects.
    Viewer { room_host: String },
}

/// One registered peer. The sender is the write half of the peer's
/// persistent channel; a dedicated writer task drains it in FIFO order,
/// so pushes from any task are safe and ordered.
#[derive(Debug, Clone)]
pub struct PeerSession {
    pub id: String,
    pub role: PeerRole,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("peer id {0:?} is already registered")]
    AlreadyExists(String),
}

/// Concurrency-safe map of currently-connected peers.
///
/// Single source of truth for membership. Cheap to clone; all clones
/// share the same map.
#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: Arc<DashMap<String, PeerSession>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic check-and-insert. An id that is already present is never
    /// overwritten.
    pub fn register(&self, session: PeerSession) -> Result<(), RegisterError> {
        match self.peers.entry(session.id.clone()) {
            Entry::Occupied(entry) => Err(RegisterError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Option<PeerSession> {
        self.peers.get(id).map(|entry| entry.value().clone())
    }

    /// Idempotent; a missing id is a no-op. The id becomes immediately
    /// available for re-registration.
    pub fn remove(&self, id: &str) {
        self.peers.remove(id);
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
