//! Fixed CORS header set for the chat endpoint
//!
//! Attached to every chat response except the 405. Not a tower layer, since a
//! layer would also decorate the 405 and the static assets.

use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};

pub(crate) const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
];

/// Empty-body preflight answer
pub(crate) fn preflight() -> Response {
    (StatusCode::OK, CORS_HEADERS).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preflight_has_headers_and_empty_body() {
        let response = preflight();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }
}
