use async_trait::async_trait;
use rg_core::FeedCache;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-process feed cache. No expiry and no size bound: one entry per
/// configured source.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        let bytes = value.len();
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        debug!(key, bytes, "Cache entry written");
    }

    async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            debug!(key, "Cache entry removed");
        }
    }

    async fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
