use async_trait::async_trait;

/// Shared store for serialized feeds, keyed by source key.
///
/// Implementations must be safe under any number of concurrent readers and
/// writers, and a reader racing a writer sees either the old or the new value.
#[async_trait]
pub trait FeedCache: Send + Sync {
    /// Returns the last stored feed for `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing whatever was there.
    async fn set(&self, key: &str, value: String);

    /// Removes the entry for `key`. A missing key is not an error.
    async fn delete(&self, key: &str);

    /// Keys that currently hold a value.
    async fn keys(&self) -> Vec<String>;

    /// Number of keys that currently hold a value.
    async fn len(&self) -> usize {
        self.keys().await.len()
    }

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
