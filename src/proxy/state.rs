//! Proxy state shared by every request

use std::sync::Arc;

use crate::assets::AssetStore;
use crate::quota::DailyQuota;

use super::upstream::Upstream;

const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared state for the gateway
///
/// Built once at startup from `Config`; the handler itself keeps no mutable
/// state between requests.
#[derive(Clone)]
pub struct ProxyState {
    /// Upstream chat API client (holds the credential)
    pub(crate) upstream: Arc<dyn Upstream>,
    /// Daily quota; `None` means rate limiting is disabled
    pub(crate) quota: Option<DailyQuota>,
    /// Static asset store for every non-API path
    pub(crate) assets: Arc<dyn AssetStore>,
    /// Trusted header carrying the client IP
    pub(crate) client_ip_header: String,
    /// Cap on the buffered chat request body
    pub(crate) max_body_bytes: usize,
}

impl ProxyState {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        quota: Option<DailyQuota>,
        assets: Arc<dyn AssetStore>,
        client_ip_header: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            quota,
            assets,
            client_ip_header: client_ip_header.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the chat request body cap
    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
