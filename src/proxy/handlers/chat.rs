//! Chat endpoint: CORS, method gate, daily quota, upstream forward, relay

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::proxy::cors::{self, CORS_HEADERS};
use crate::proxy::error::ChatError;
use crate::proxy::helpers::{client_identifier, utc_today};
use crate::proxy::state::ProxyState;
use crate::quota::QuotaDecision;

/// Handler mounted on the chat path for every method
pub async fn chat_handler(State(state): State<ProxyState>, req: Request<Body>) -> Response {
    match handle_chat(&state, req).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn handle_chat(state: &ProxyState, req: Request<Body>) -> Result<Response, ChatError> {
    if req.method() == Method::OPTIONS {
        return Ok(cors::preflight());
    }

    if req.method() != Method::POST {
        tracing::debug!("Rejecting {} on chat endpoint", req.method());
        return Err(ChatError::MethodNotAllowed);
    }

    let client = client_identifier(req.headers(), &state.client_ip_header);

    match &state.quota {
        Some(quota) => {
            let decision = quota
                .check_and_count(&client, utc_today())
                .await
                .map_err(|e| ChatError::upstream(format!("counter store: {e}")))?;

            if let QuotaDecision::Exhausted { count } = decision {
                tracing::info!(client = %client, count, "Daily quota exceeded");
                return Err(ChatError::QuotaExceeded {
                    limit: quota.limit(),
                });
            }
        }
        None => tracing::trace!("Rate limiting disabled, forwarding without quota check"),
    }

    let body_bytes = axum::body::to_bytes(req.into_body(), state.max_body_bytes)
        .await
        .map_err(ChatError::upstream)?;
    let payload: Value = serde_json::from_slice(&body_bytes).map_err(ChatError::upstream)?;

    tracing::debug!(client = %client, body_size = body_bytes.len(), "Forwarding chat request");

    let reply = state
        .upstream
        .forward(&payload)
        .await
        .map_err(ChatError::upstream)?;

    let status = StatusCode::from_u16(reply.status).map_err(ChatError::upstream)?;
    tracing::info!(client = %client, status = reply.status, "Chat request relayed");

    Ok((status, CORS_HEADERS, Json(reply.body)).into_response())
}
