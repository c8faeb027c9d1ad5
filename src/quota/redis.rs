//! Redis-backed counter store, shared by every instance pointing at the same server

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use super::{CounterError, CounterStore};

/// Counter store using `GET` and `SET key value EX ttl`
pub struct RedisCounterStore {
    connection_manager: ConnectionManager,
}

impl RedisCounterStore {
    /// Open a managed (auto-reconnecting) connection
    pub async fn connect(url: &str) -> Result<Self, CounterError> {
        let client = redis::Client::open(url).map_err(|e| {
            CounterError::Connection(format!("Could not create redis client: {e}"))
        })?;
        let connection_manager = ConnectionManager::new(client).await.map_err(|e| {
            CounterError::Connection(format!("Could not connect to redis: {e}"))
        })?;

        Ok(Self { connection_manager })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CounterError> {
        let mut conn = self.connection_manager.clone();
        conn.get(key)
            .await
            .map_err(|e| CounterError::Get(e.to_string()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CounterError> {
        let mut conn = self.connection_manager.clone();
        // Redis rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CounterError::Put(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
