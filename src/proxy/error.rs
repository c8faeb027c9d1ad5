//! Chat endpoint errors and their HTTP responses

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::cors::CORS_HEADERS;

/// Every way the chat endpoint can refuse or fail a request
#[derive(Debug)]
pub(crate) enum ChatError {
    /// Anything other than POST or OPTIONS on the chat path
    MethodNotAllowed,
    /// The client used up its daily quota
    QuotaExceeded { limit: u32 },
    /// Body parse, counter store, network, or upstream decode failure
    UpstreamFailure(String),
}

impl ChatError {
    pub(crate) fn upstream(err: impl std::fmt::Display) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::QuotaExceeded { limit } => write!(
                f,
                "Daily limit of {limit} questions reached. Please try again tomorrow."
            ),
            Self::UpstreamFailure(msg) => write!(f, "Worker error: {msg}"),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response<Body> {
        let status = match self {
            // No CORS headers on 405
            Self::MethodNotAllowed => {
                return (StatusCode::METHOD_NOT_ALLOWED, self.to_string()).into_response();
            }
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamFailure(_) => {
                tracing::error!("Chat proxy error: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = json!({ "error": { "message": self.to_string() } });
        (status, CORS_HEADERS, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_plain_text_without_cors() {
        let response = ChatError::MethodNotAllowed.into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_string(response).await, "Method not allowed");
    }

    #[tokio::test]
    async fn test_quota_exceeded_body() {
        let response = ChatError::QuotaExceeded { limit: 20 }.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            body_string(response).await,
            r#"{"error":{"message":"Daily limit of 20 questions reached. Please try again tomorrow."}}"#
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_body() {
        let response = ChatError::upstream("connection refused").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            body_string(response).await,
            r#"{"error":{"message":"Worker error: connection refused"}}"#
        );
    }
}
