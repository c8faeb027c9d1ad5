//! Per-client daily quota
//!
//! Counts accepted chat requests per `(client, UTC day)` in an external
//! counter store. The sequence is read, compare, then write `count + 1` with a
//! fresh expiry. The read and the write are two separate store operations, so
//! concurrent requests from one client can both pass the check before either
//! write lands; the accepted count may then exceed the limit. That race is
//! accepted: stores only need plain get/put with per-key expiry.

pub mod in_memory;
#[cfg(feature = "redis")]
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::config::{CounterBackend, QuotaConfig};

pub use in_memory::InMemoryCounterStore;

// ─────────────────────────────────────────────────────────────────────────────
// Counter Store
// ─────────────────────────────────────────────────────────────────────────────

/// Errors surfaced by a counter store backend
///
/// Only networked backends construct these; the in-memory store cannot fail.
#[derive(Debug)]
#[cfg_attr(not(feature = "redis"), allow(dead_code))]
pub enum CounterError {
    /// Backend could not be reached or initialized
    Connection(String),
    /// A read failed
    Get(String),
    /// A write failed
    Put(String),
}

impl std::fmt::Display for CounterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "counter store unavailable: {e}"),
            Self::Get(e) => write!(f, "counter store read failed: {e}"),
            Self::Put(e) => write!(f, "counter store write failed: {e}"),
        }
    }
}

impl std::error::Error for CounterError {}

/// Key-value store with per-key expiry, holding string-encoded counts
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Read the raw value for a key, if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>, CounterError>;

    /// Overwrite the value for a key, expiring it after `ttl`
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CounterError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys and values
// ─────────────────────────────────────────────────────────────────────────────

/// Storage key for one client on one UTC day: `rate:<client>:<YYYY-MM-DD>`
pub fn quota_key(client: &str, day: NaiveDate) -> String {
    format!("rate:{}:{}", client, day.format("%Y-%m-%d"))
}

/// Parse a stored count leniently.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of ASCII digits; anything after the digits is ignored. Missing digits count
/// as 0; a digit run too large for `i64` saturates.
pub fn parse_count(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    let digits = &rest[..digits_end];
    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if digits.is_empty() => 0,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Daily Quota
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of a quota check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Request may proceed; `count` is the value just written
    Accepted { count: i64 },
    /// Limit already reached; nothing was written
    Exhausted { count: i64 },
}

/// Daily request quota backed by a counter store
#[derive(Clone)]
pub struct DailyQuota {
    store: Arc<dyn CounterStore>,
    limit: u32,
    ttl: Duration,
}

impl DailyQuota {
    pub fn new(store: Arc<dyn CounterStore>, limit: u32, ttl: Duration) -> Self {
        Self { store, limit, ttl }
    }

    /// Accepted requests allowed per client per day
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check the client's count for `day` and record this request if allowed
    pub async fn check_and_count(
        &self,
        client: &str,
        day: NaiveDate,
    ) -> Result<QuotaDecision, CounterError> {
        let key = quota_key(client, day);

        let count = self
            .store
            .get(&key)
            .await?
            .map(|raw| parse_count(&raw))
            .unwrap_or(0);

        if count >= i64::from(self.limit) {
            tracing::debug!(key = %key, count, limit = self.limit, "Daily quota exhausted");
            return Ok(QuotaDecision::Exhausted { count });
        }

        let next = count + 1;
        self.store.put(&key, &next.to_string(), self.ttl).await?;
        tracing::debug!(key = %key, count = next, limit = self.limit, "Quota counted");

        Ok(QuotaDecision::Accepted { count: next })
    }
}

/// Build the configured quota, or `None` when rate limiting is disabled
pub async fn from_config(config: &QuotaConfig) -> Result<Option<DailyQuota>> {
    let ttl = Duration::from_secs(config.ttl_secs);

    let store: Arc<dyn CounterStore> = match config.backend {
        CounterBackend::None => return Ok(None),
        CounterBackend::Memory => Arc::new(InMemoryCounterStore::new()),
        #[cfg(feature = "redis")]
        CounterBackend::Redis => Arc::new(redis::RedisCounterStore::connect(&config.redis_url).await?),
        #[cfg(not(feature = "redis"))]
        CounterBackend::Redis => anyhow::bail!(
            "quota backend 'redis' requires building with `--features redis`"
        ),
    };

    tracing::info!(
        "Quota enabled: {} requests/day per client ({} store)",
        config.daily_limit,
        store.name()
    );

    Ok(Some(DailyQuota::new(store, config.daily_limit, ttl)))
}
