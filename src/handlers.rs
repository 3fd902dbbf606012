use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::protocol::ServerMessage;
use crate::registry::PeerRegistry;
use crate::router::{route, RouteError};

#[derive(Debug, Deserialize)]
pub struct SdpPayload {
    pub id: String,
    pub sdp: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePayload {
    pub id: String,
    pub candidate: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    peers: usize,
}

fn status_for(result: Result<(), RouteError>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::OK,
        Err(err @ RouteError::TargetNotFound(_)) => {
            debug!(%err, "one-shot route failed");
            StatusCode::NOT_FOUND
        }
    }
}

/// POST /offer - forward an offer to peer `id`.
pub async fn post_offer(
    State(registry): State<PeerRegistry>,
    Json(payload): Json<SdpPayload>,
) -> StatusCode {
    debug!(target = %payload.id, "forwarding offer");
    status_for(route(
        &registry,
        &payload.id,
        ServerMessage::Offer { sdp: payload.sdp },
    ))
}

/// POST /answer - forward an answer to peer `id`.
pub async fn post_answer(
    State(registry): State<PeerRegistry>,
    Json(payload): Json<SdpPayload>,
) -> StatusCode {
    debug!(target = %payload.id, "forwarding answer");
    status_for(route(
        &registry,
        &payload.id,
        ServerMessage::Answer { sdp: payload.sdp },
    ))
}

/// POST /ice-candidate - forward an ICE candidate to peer `id`.
pub async fn post_ice_candidate(
    State(registry): State<PeerRegistry>,
    Json(payload): Json<CandidatePayload>,
) -> StatusCode {
    status_for(route(
        &registry,
        &payload.id,
        ServerMessage::IceCandidate {
            candidate: payload.candidate,
        },
    ))
}

/// GET /health - liveness probe.
pub async fn health_check(State(registry): State<PeerRegistry>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        peers: registry.len(),
    })
}

/// GET / - minimal front-end page. The real client lives elsewhere; this
/// is just enough to see the relay is up.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>driftway</title></head>
  <body>
    <h1>driftway</h1>
    <p>Rendezvous relay is running. Connect a peer at <code>/ws</code>.</p>
  </body>
</html>
"#;
