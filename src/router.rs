use thiserror::Error;
use tracing::debug;

use crate::protocol::ServerMessage;
use crate::registry::PeerRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no registered peer with id {0:?}")]
    TargetNotFound(String),
}

/// Forward a message to the peer registered under `target_id`.
///
/// Fire-and-forget: success means the message was handed to the target's
/// outbound channel, not that the remote end processed it. A peer whose
/// channel is already tearing down is indistinguishable from one that
/// was never registered.
pub fn route(
    registry: &PeerRegistry,
    target_id: &str,
    message: ServerMessage,
) -> Result<(), RouteError> {
    let session = registry
        .lookup(target_id)
        .ok_or_else(|| RouteError::TargetNotFound(target_id.to_string()))?;

    if session.tx.send(message).is_err() {
        debug!(peer = %target_id, "outbound channel closed mid-route");
        return Err(RouteError::TargetNotFound(target_id.to_string()));
    }
    Ok(())
}
