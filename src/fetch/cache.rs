use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
    time::{Duration, Instant},
};
use tracing::debug;

struct Entry {
    fetched_at: Instant,
    bytes: Arc<Vec<u8>>,
}

/// Raw workbook bytes keyed by source, each kept for `ttl`.
pub struct FetchCache {
    ttl: Duration,
    map: RwLock<HashMap<String, Entry>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            map: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached bytes for `key` if they are younger than the TTL.
    pub fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        let entry = map.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.bytes))
        } else {
            debug!(key, "cache entry expired");
            None
        }
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) -> Arc<Vec<u8>> {
        let bytes = Arc::new(bytes);
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(
            key.to_string(),
            Entry {
                fetched_at: Instant::now(),
                bytes: Arc::clone(&bytes),
            },
        );
        bytes
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        let before = map.len();
        let ttl = self.ttl;
        map.retain(|_, e| e.fetched_at.elapsed() < ttl);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
