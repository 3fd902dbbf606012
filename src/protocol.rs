use serde::{Deserialize, Serialize};

/// First message a peer must send after opening its persistent channel.
///
/// The `action` field selects the intent; anything that does not parse
/// into one of these variants is a malformed handshake and the channel
/// is closed without creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HandshakeRequest {
    /// Claim an id and open a room guarded by `password`.
    RegisterHost { id: String, password: String },
    /// Join the room of a registered host, authenticated by the host's
    /// password.
    JoinViewer {
        id: String,
        host_id: String,
        password: String,
    },
}

/// Messages pushed to a peer over its persistent channel.
///
/// Negotiation payloads (`sdp`, `candidate`) are opaque to the relay and
/// forwarded verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake acknowledgment; carries the id the peer registered under.
    Success { peer_id: String },
    Error { message: String },
    Offer { sdp: serde_json::Value },
    Answer { sdp: serde_json::Value },
    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: serde_json::Value },
    /// Sent to a host when a viewer joins its room.
    ViewerJoined { viewer_id: String },
}
