//! Configuration for the gateway
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file ($CHATGATE_CONFIG or ~/.config/chatgate/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod quota;
mod serialization;
mod upstream;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use quota::{CounterBackend, FileQuota, QuotaConfig};
pub use upstream::{AssetsConfig, FileAssets, FileUpstream, UpstreamConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address
const DEFAULT_BIND: &str = "127.0.0.1:8787";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server to
    pub bind_addr: SocketAddr,

    /// Upstream chat API endpoint and credential
    pub upstream: UpstreamConfig,

    /// Daily per-client quota
    pub quota: QuotaConfig,

    /// Static asset directory
    pub assets: AssetsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            upstream: UpstreamConfig::default(),
            quota: QuotaConfig::default(),
            assets: AssetsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub bind_addr: Option<String>,

    /// Optional [upstream] section
    pub upstream: Option<FileUpstream>,

    /// Optional [quota] section
    pub quota: Option<FileQuota>,

    /// Optional [assets] section
    pub assets: Option<FileAssets>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: $CHATGATE_CONFIG, else ~/.config/chatgate/config.toml
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CHATGATE_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|p| p.join(".config").join("chatgate").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        // Config is optional, a read-only home is not an error
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A file that exists but cannot be read or parsed is an error: a broken
    /// config must fail startup instead of silently falling back to defaults.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_file_config(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Cannot read config file {}", path.display())),
        }
    }

    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config()?;
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    pub(crate) fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // Bind address: env > file > default
        let bind_raw = env("CHATGATE_BIND")
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind_raw
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", bind_raw))?;

        let upstream = UpstreamConfig::from_file(
            file.upstream,
            env("ANTHROPIC_API_URL"),
            env("ANTHROPIC_API_KEY"),
        );

        let quota = QuotaConfig::from_file(
            file.quota,
            env("CHATGATE_QUOTA_BACKEND"),
            env("CHATGATE_REDIS_URL"),
        )?;

        let assets = AssetsConfig::from_file(file.assets, env("CHATGATE_ASSETS_DIR"));
        let logging = LoggingConfig::from_file(file.logging);

        Ok(Self {
            bind_addr,
            upstream,
            quota,
            assets,
            logging,
        })
    }
}
