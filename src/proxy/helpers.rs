//! Utility functions for request processing

use axum::http::HeaderMap;
use chrono::{NaiveDate, Utc};

/// Identifier used when the connecting-IP header is missing
pub(crate) const UNKNOWN_CLIENT: &str = "unknown";

/// Extract the client identifier from the trusted connecting-IP header.
///
/// Falls back to `"unknown"` when the header is absent, empty, or not valid
/// visible ASCII, so all such callers share one quota bucket.
pub(crate) fn client_identifier(headers: &HeaderMap, header_name: &str) -> String {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Current calendar day in UTC
pub(crate) fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_identifier_reads_header() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.4"));

        // Header lookup is case-insensitive
        assert_eq!(client_identifier(&headers, "CF-Connecting-IP"), "198.51.100.4");
    }

    #[test]
    fn test_client_identifier_falls_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_identifier(&headers, "CF-Connecting-IP"), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static(""));
        assert_eq!(client_identifier(&headers, "CF-Connecting-IP"), "unknown");
    }

    #[test]
    fn test_client_identifier_ignores_other_ip_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(client_identifier(&headers, "CF-Connecting-IP"), "unknown");
    }
}
