// src/cache/memory.rs
// In-process expiring map. Lazy eviction on read; the map is swept when it
// grows past the size threshold. The check-TTL-then-evict sequence is not
// atomic on its own, so every read-check-write runs under one mutex guard.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

use super::CacheStore;

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        if entries.len() >= self.max_entries {
            let now = Instant::now();
            let before = entries.len();
            entries.retain(|_, entry| entry.expires_at > now);
            debug!("Cache sweep: {} -> {} entries", before, entries.len());
        }
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.remove(key);
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
