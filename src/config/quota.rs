//! Daily quota configuration
//!
//! The counter backend decides where per-client daily counts live. `none`
//! turns rate limiting off entirely; the handler then forwards every request.

use anyhow::{bail, Result};
use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Counter Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Where quota counters are stored
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CounterBackend {
    /// Rate limiting disabled
    None,
    /// Process-local map with per-key expiry (default)
    #[default]
    Memory,
    /// Redis, shared across instances (requires the `redis` feature)
    Redis,
}

impl CounterBackend {
    /// Parse backend string from config or env
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "disabled" => Ok(Self::None),
            "memory" | "in_memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => bail!(
                "Unknown quota backend '{}' (expected none, memory or redis)",
                other
            ),
        }
    }

    /// Convert to string for TOML serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Quota Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Per-client daily quota settings
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    /// Counter store backend
    pub backend: CounterBackend,
    /// Accepted requests per client per UTC day
    pub daily_limit: u32,
    /// Expiry applied to every counter write
    pub ttl_secs: u64,
    /// Trusted header carrying the connecting client's IP
    pub client_ip_header: String,
    /// Redis connection string (used when backend = redis)
    pub redis_url: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            backend: CounterBackend::Memory,
            daily_limit: 20,
            ttl_secs: 86_400,
            client_ip_header: "CF-Connecting-IP".to_string(),
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

/// Quota settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileQuota {
    pub backend: Option<String>,
    pub daily_limit: Option<u32>,
    pub ttl_secs: Option<u64>,
    pub client_ip_header: Option<String>,
    pub redis_url: Option<String>,
}

impl QuotaConfig {
    /// Create from file config; env overrides win for backend and redis URL
    pub fn from_file(
        file: Option<FileQuota>,
        env_backend: Option<String>,
        env_redis_url: Option<String>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let backend = match env_backend.or(file.backend) {
            Some(raw) => CounterBackend::parse(&raw)?,
            None => defaults.backend,
        };

        Ok(Self {
            backend,
            daily_limit: file.daily_limit.unwrap_or(defaults.daily_limit),
            ttl_secs: file.ttl_secs.unwrap_or(defaults.ttl_secs),
            client_ip_header: file
                .client_ip_header
                .unwrap_or(defaults.client_ip_header),
            redis_url: env_redis_url
                .or(file.redis_url)
                .unwrap_or(defaults.redis_url),
        })
    }

    /// Whether requests are counted at all
    pub fn is_enabled(&self) -> bool {
        self.backend != CounterBackend::None
    }
}
