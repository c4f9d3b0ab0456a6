//! Test doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use rg_core::{Error, FeedCache, RawRecord, Result};
use rg_storage::MemoryCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::extractor::{ExtractionScript, Extractor};
use crate::source::{Cadence, NormalizationPolicy, SourceDescriptor};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Records(Vec<RawRecord>),
    Fail(String),
    Panic,
}

/// Extractor that counts its calls and answers with a canned reply.
pub(crate) struct MockExtractor {
    calls: AtomicUsize,
    reply: Mutex<Reply>,
    delay: Duration,
}

impl MockExtractor {
    pub(crate) fn returning(records: Vec<RawRecord>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Mutex::new(Reply::Records(records)),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        let mock = Self::returning(Vec::new());
        mock.reply_with(Reply::Fail(message.to_string()));
        mock
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn reply_with(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, _target: &str, _script: &ExtractionScript) -> Result<Vec<RawRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Records(records) => Ok(records),
            Reply::Fail(message) => Err(Error::Extraction(message)),
            Reply::Panic => panic!("extractor blew up"),
        }
    }
}

/// Memory cache that counts writes.
#[derive(Default)]
pub(crate) struct CountingCache {
    inner: MemoryCache,
    writes: AtomicUsize,
}

impl CountingCache {
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedCache for CountingCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) {
        self.inner.delete(key).await
    }

    async fn keys(&self) -> Vec<String> {
        self.inner.keys().await
    }
}

pub(crate) fn descriptor(key: &str) -> SourceDescriptor {
    SourceDescriptor {
        key: key.to_string(),
        title: format!("{} feed", key),
        link: format!("https://{}.example.com/", key),
        description: format!("Latest from {}", key),
        target: format!("https://{}.example.com/news", key),
        script: ExtractionScript::new("article"),
        cadence: Cadence::Every(Duration::from_secs(3600)),
        policy: NormalizationPolicy::default(),
    }
}

pub(crate) fn record(title: &str, link: &str, date: &str) -> RawRecord {
    RawRecord::new()
        .with("title", title)
        .with("link", link)
        .with("description", format!("About {}", title))
        .with("date", date)
}
