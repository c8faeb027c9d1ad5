//! Request handlers for the gateway
//!
//! `chat_handler` owns the API path; `asset_handler` is the router fallback
//! for everything else.

mod chat;

pub use chat::chat_handler;

use axum::{body::Body, extract::State, http::Request, response::Response};

use super::state::ProxyState;

/// Fallback handler: return the asset store's response unmodified
pub async fn asset_handler(State(state): State<ProxyState>, req: Request<Body>) -> Response {
    tracing::trace!("Serving asset {}", req.uri().path());
    state.assets.fetch(req).await
}
