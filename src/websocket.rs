use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{HandshakeRequest, ServerMessage};
use crate::registry::{PeerRegistry, PeerRole, PeerSession, RegisterError};

/// Why a handshake was rejected. The message text is what the peer sees
/// before its channel is closed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("malformed handshake: {0}")]
    Malformed(String),
    #[error("{0} must be non-empty")]
    EmptyField(&'static str),
    #[error("id {0:?} is already taken")]
    IdTaken(String),
    #[error("host {0:?} is not registered")]
    UnknownHost(String),
    #[error("wrong password")]
    WrongPassword,
}

/// GET /ws - open a persistent channel. The first message the peer sends
/// over it drives the handshake.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(registry): State<PeerRegistry>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// One task per connection: Connecting -> Authenticating -> Active ->
/// Closed. Whatever path leads out of here, the registry entry for this
/// peer (if one was created) is gone before the task exits.
async fn handle_socket(socket: WebSocket, registry: PeerRegistry) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Single writer per socket. Everything any task pushes onto `tx` is
    // written out in submission order.
    let writer = tokio::spawn(write_outbound(rx, sender));

    let peer_id = match authenticate(&mut receiver, &registry, &tx).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            // Channel closed before any handshake arrived.
            drop(tx);
            let _ = writer.await;
            return;
        }
        Err(err) => {
            warn!(%err, "handshake rejected");
            let _ = tx.send(ServerMessage::Error {
                message: err.to_string(),
            });
            drop(tx);
            let _ = writer.await;
            return;
        }
    };

    // Active: pure listen loop. Negotiation payloads arrive through the
    // one-shot routes, not this channel; we only watch for closure.
    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(peer = %peer_id, %err, "transport error");
                break;
            }
        }
    }

    registry.remove(&peer_id);
    info!(peer = %peer_id, "peer disconnected");
    drop(tx);
    let _ = writer.await;
}

async fn write_outbound(
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    mut sender: SplitSink<WebSocket, Message>,
) {
    while let Some(msg) = rx.recv().await {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            Err(err) => warn!(%err, "failed to encode outbound message"),
        }
    }
    // Best effort: the remote may already be gone.
    let _ = sender.send(Message::Close(None)).await;
}

/// Wait for the peer's control message and apply it.
///
/// `Ok(Some(id))` means the peer is registered and acknowledged;
/// `Ok(None)` means the channel closed first. Ping/pong frames are
/// ignored, and JSON arriving in a binary frame is tolerated.
async fn authenticate(
    receiver: &mut SplitStream<WebSocket>,
    registry: &PeerRegistry,
    tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<Option<String>, HandshakeError> {
    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => text,
                Err(_) => {
                    return Err(HandshakeError::Malformed(
                        "binary frame is not UTF-8".into(),
                    ))
                }
            },
            Ok(Message::Close(_)) | Err(_) => return Ok(None),
            Ok(_) => continue,
        };

        let request = serde_json::from_str::<HandshakeRequest>(&text)
            .map_err(|err| HandshakeError::Malformed(err.to_string()))?;
        let peer_id = perform_handshake(registry, tx, request)?;
        let _ = tx.send(ServerMessage::Success {
            peer_id: peer_id.clone(),
        });
        return Ok(Some(peer_id));
    }
    Ok(None)
}

/// Validate a declared intent and register the session. On any error no
/// session exists for this connection.
fn perform_handshake(
    registry: &PeerRegistry,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    request: HandshakeRequest,
) -> Result<String, HandshakeError> {
    match request {
        HandshakeRequest::RegisterHost { id, password } => {
            if id.is_empty() || password.is_empty() {
                return Err(HandshakeError::EmptyField("id and password"));
            }
            registry
                .register(PeerSession {
                    id: id.clone(),
                    role: PeerRole::Host {
                        credential: password,
                    },
                    tx: tx.clone(),
                })
                .map_err(|err| match err {
                    RegisterError::AlreadyExists(id) => HandshakeError::IdTaken(id),
                })?;
            info!(host = %id, "host registered");
            Ok(id)
        }
        HandshakeRequest::JoinViewer {
            id,
            host_id,
            password,
        } => {
            if id.is_empty() {
                return Err(HandshakeError::EmptyField("id"));
            }
            let host = registry
                .lookup(&host_id)
                .ok_or_else(|| HandshakeError::UnknownHost(host_id.clone()))?;
            let PeerRole::Host { credential } = &host.role else {
                return Err(HandshakeError::UnknownHost(host_id));
            };
            if *credential != password {
                return Err(HandshakeError::WrongPassword);
            }
            registry
                .register(PeerSession {
                    id: id.clone(),
                    role: PeerRole::Viewer {
                        room_host: host_id.clone(),
                    },
                    tx: tx.clone(),
                })
                .map_err(|err| match err {
                    RegisterError::AlreadyExists(id) => HandshakeError::IdTaken(id),
                })?;
            // The host may be tearing down right now; the viewer keeps
            // its session either way.
            let _ = host.tx.send(ServerMessage::ViewerJoined {
                viewer_id: id.clone(),
            });
            info!(viewer = %id, host = %host_id, "viewer joined");
            Ok(id)
        }
    }
}
