// src/cache/redis_store.rs
// Shared networked backend over Redis. Values are stored as JSON strings via
// SET EX; Redis handles expiry and cross-process consistency. Backend errors
// degrade to cache misses and are logged, never propagated.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use super::CacheStore;

/// Upper bound on the initial connection attempt. The connection manager
/// retries with exponential backoff on its own; without a bound here an
/// unreachable store would stall startup instead of falling back promptly.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = tokio::time::timeout(CONNECT_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| anyhow!("connection attempt timed out after {CONNECT_TIMEOUT:?}"))?
            .context("initial connection failed")?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Redis GET failed for {key}: {e}");
                return None;
            }
        };
        raw.and_then(|s| serde_json::from_str(&s).ok())
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);
        let payload = value.to_string();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, payload, ttl_secs).await {
            warn!("Redis SET failed for {key}: {e}");
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.conn.clone();
        if let Err(e) = conn.del::<_, ()>(key).await {
            warn!("Redis DEL failed for {key}: {e}");
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
