// src/cache/mod.rs
// Content-addressed TTL cache shielding the LLM orchestrator from redundant
// provider calls. Two interchangeable backends: a shared Redis store for
// multi-process deployments and an in-process expiring map used when the
// shared store is unreachable at startup.

mod memory;
mod redis_store;

pub use memory::MemoryCache;
pub use redis_store::RedisCache;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Minimal capability surface the orchestrator needs. Cache failures are
/// soft: a broken backend behaves like an empty cache, never an error.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Expired entries are treated as absent.
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn delete(&self, key: &str);
    /// Backend name for logging.
    fn backend(&self) -> &'static str;
}

/// Connect the shared store if configured and reachable, otherwise fall back
/// to the in-process map.
pub async fn connect_cache(redis_url: Option<&str>, max_entries: usize) -> Arc<dyn CacheStore> {
    if let Some(url) = redis_url {
        match RedisCache::connect(url).await {
            Ok(cache) => {
                info!("Cache backend: redis at {url}");
                return Arc::new(cache);
            }
            Err(e) => {
                warn!("Redis unavailable ({e}), falling back to in-process cache");
            }
        }
    }
    info!("Cache backend: in-process (max {max_entries} entries)");
    Arc::new(MemoryCache::new(max_entries))
}
