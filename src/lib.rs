//! Rendezvous relay for peer-to-peer media negotiation.
//!
//! A host registers an id and password over a WebSocket, viewers join
//! the host's room through the same channel, and offer/answer/ICE
//! payloads are forwarded between peers via one-shot HTTP routes. The
//! relay never interprets negotiation payloads and keeps no state
//! beyond the in-memory peer registry.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_check, index, post_answer, post_ice_candidate, post_offer};
use crate::registry::PeerRegistry;
use crate::websocket::websocket_handler;

/// Build the full HTTP/WebSocket surface around a registry instance.
pub fn app(registry: PeerRegistry) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ws", get(websocket_handler))
        .route("/offer", post(post_offer))
        .route("/answer", post(post_answer))
        .route("/ice-candidate", post(post_ice_candidate))
        .with_state(registry)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
