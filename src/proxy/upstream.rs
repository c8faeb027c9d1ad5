//! Upstream chat-completion client
//!
//! The inbound JSON is re-serialized and POSTed to a fixed endpoint with the
//! service credential attached; the upstream status and JSON body come back
//! as an `UpstreamReply`. Any transport, timeout, or decode failure is an
//! error for the caller to turn into a 500.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use crate::config::UpstreamConfig;

/// Status and parsed body returned by the upstream API
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Value,
}

/// Forwards a chat request body to the upstream API
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, body: &Value) -> Result<UpstreamReply>;
}

/// Anthropic Messages API client
pub struct AnthropicUpstream {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    api_version: String,
}

impl AnthropicUpstream {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        // Build the HTTP client with timeout and connection pooling
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to create HTTP client")?;

        if config.api_key.is_none() {
            tracing::warn!("No upstream API key configured (set ANTHROPIC_API_KEY); requests will be rejected upstream");
        }

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
        })
    }
}

#[async_trait]
impl Upstream for AnthropicUpstream {
    async fn forward(&self, body: &Value) -> Result<UpstreamReply> {
        let payload = serde_json::to_vec(body)?;

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header("anthropic-version", &self.api_version)
            .body(payload);

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let raw: Bytes = response.bytes().await?;

        tracing::debug!(status, body_size = raw.len(), "Upstream responded");

        let body = serde_json::from_slice::<Value>(&raw)?;
        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Serve `app` on an ephemeral local port, returning the messages URL
    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    /// Reflects the headers and raw body the gateway sent
    async fn echo(headers: HeaderMap, body: Bytes) -> Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "key": header("x-api-key"),
            "ver": header("anthropic-version"),
            "ct": header("content-type"),
            "raw": String::from_utf8_lossy(&body),
        }))
    }

    fn upstream_for(url: String, api_key: Option<&str>) -> AnthropicUpstream {
        AnthropicUpstream::from_config(&UpstreamConfig {
            url,
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_forward_sends_fixed_headers_and_credential() {
        let url = serve(Router::new().route("/v1/messages", post(echo))).await;
        let upstream = upstream_for(url, Some("sk-test"));

        let reply = upstream.forward(&json!({"a": 1})).await.unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.body["key"], "sk-test");
        assert_eq!(reply.body["ver"], "2023-06-01");
        assert_eq!(reply.body["ct"], "application/json");
        assert_eq!(reply.body["raw"], r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_forward_omits_credential_when_unset() {
        let url = serve(Router::new().route("/v1/messages", post(echo))).await;
        let upstream = upstream_for(url, None);

        let reply = upstream.forward(&json!({})).await.unwrap();

        assert!(reply.body["key"].is_null());
        assert_eq!(reply.body["ver"], "2023-06-01");
    }

    #[tokio::test]
    async fn test_forward_keeps_body_key_order() {
        let url = serve(Router::new().route("/v1/messages", post(echo))).await;
        let upstream = upstream_for(url, Some("sk-test"));

        let body: Value = serde_json::from_str(r#"{"z":1,"a":2,"m":[3]}"#).unwrap();
        let reply = upstream.forward(&body).await.unwrap();

        assert_eq!(reply.body["raw"], r#"{"z":1,"a":2,"m":[3]}"#);
    }

    #[tokio::test]
    async fn test_forward_relays_error_status() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"type": "error", "error": {"type": "rate_limit_error"}})),
                )
            }),
        );
        let upstream = upstream_for(serve(app).await, Some("sk-test"));

        let reply = upstream.forward(&json!({})).await.unwrap();

        assert_eq!(reply.status, 429);
        assert_eq!(reply.body["error"]["type"], "rate_limit_error");
    }

    #[tokio::test]
    async fn test_non_json_reply_is_error() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
        );
        let upstream = upstream_for(serve(app).await, Some("sk-test"));

        assert!(upstream.forward(&json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_refused_connection_is_error() {
        // Grab a free port, then close it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let upstream = upstream_for(format!("http://{addr}/v1/messages"), Some("sk-test"));

        assert!(upstream.forward(&json!({})).await.is_err());
    }
}
