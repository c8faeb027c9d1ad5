//! Upstream API and static asset configuration

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Upstream
// ─────────────────────────────────────────────────────────────────────────────

/// Upstream chat API settings
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Full endpoint URL requests are POSTed to
    pub url: String,
    /// Service credential sent as `x-api-key` (never logged)
    pub api_key: Option<String>,
    /// Value of the `anthropic-version` header
    pub api_version: String,
    /// Whole-request timeout for the upstream call
    pub timeout_secs: u64,
    /// Largest inbound chat body buffered before forwarding
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "********"))
            .field("api_version", &self.api_version)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: None,
            api_version: "2023-06-01".to_string(),
            timeout_secs: 300,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Upstream settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileUpstream {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_body_bytes: Option<usize>,
}

impl UpstreamConfig {
    /// Create from file config; env values for URL and credential take precedence
    pub fn from_file(
        file: Option<FileUpstream>,
        env_url: Option<String>,
        env_api_key: Option<String>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            url: env_url.or(file.url).unwrap_or(defaults.url),
            api_key: env_api_key
                .or(file.api_key)
                .filter(|key| !key.trim().is_empty()),
            api_version: file.api_version.unwrap_or(defaults.api_version),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            max_body_bytes: file.max_body_bytes.unwrap_or(defaults.max_body_bytes),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Static Assets
// ─────────────────────────────────────────────────────────────────────────────

/// Static asset settings
#[derive(Debug, Clone)]
pub struct AssetsConfig {
    /// Directory served for every non-API path
    pub dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./public"),
        }
    }
}

/// Asset settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileAssets {
    pub dir: Option<String>,
}

impl AssetsConfig {
    /// Create from file config; env override wins
    pub fn from_file(file: Option<FileAssets>, env_dir: Option<String>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            dir: env_dir
                .or(file.dir)
                .map(PathBuf::from)
                .unwrap_or_else(|| Self::default().dir),
        }
    }
}
