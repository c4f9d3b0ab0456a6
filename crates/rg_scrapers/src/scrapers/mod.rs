use async_trait::async_trait;
use chrono::Utc;
use rg_core::{CanonicalFeed, FeedCache, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::context::ScrapeContext;
use crate::extractor::Extractor;
use crate::normalize::normalize;
use crate::source::SourceDescriptor;

pub mod sources;

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the static description of the source
    fn descriptor(&self) -> &SourceDescriptor;

    fn key(&self) -> &str {
        &self.descriptor().key
    }

    /// Returns the serialized feed. Unless `force` is set a cached copy is
    /// served without touching the source.
    async fn scrape(&self, ctx: &ScrapeContext, force: bool) -> Result<String>;
}

/// Fetcher shared by every source; the descriptor is the only thing that
/// differs between them.
pub struct SourceScraper {
    descriptor: SourceDescriptor,
    cache: Arc<dyn FeedCache>,
    extractor: Arc<dyn Extractor>,
}

impl SourceScraper {
    pub fn new(descriptor: SourceDescriptor, cache: Arc<dyn FeedCache>, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            descriptor,
            cache,
            extractor,
        }
    }

    async fn refresh(&self, ctx: &ScrapeContext) -> Result<String> {
        let d = &self.descriptor;
        let started = Instant::now();
        let raw = ctx.run(self.extractor.extract(&d.target, &d.script)).await?;

        let now = Utc::now();
        let mut feed = CanonicalFeed::new(d.title.as_str(), d.link.as_str(), d.description.as_str(), now);
        feed.items = raw.iter().map(|record| normalize(&d.policy, record, now)).collect();

        // Serialize before touching the cache so a failure leaves the old entry.
        let xml = feed.to_rss()?;
        self.cache.set(&d.key, xml.clone()).await;

        info!(
            source = %d.key,
            items = feed.items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "✨ Feed refreshed"
        );
        Ok(xml)
    }
}

#[async_trait]
impl Scraper for SourceScraper {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    async fn scrape(&self, ctx: &ScrapeContext, force: bool) -> Result<String> {
        let key = &self.descriptor.key;
        if !force {
            if let Some(cached) = self.cache.get(key).await {
                debug!(source = %key, "Cache hit");
                return Ok(cached);
            }
        }

        info!("🦗 Scraping {} (force: {})", self.descriptor.title, force);
        match self.refresh(ctx).await {
            Ok(xml) => Ok(xml),
            Err(e) => {
                error!(source = %key, error = %e, "Scrape failed, cache left untouched");
                Err(e)
            }
        }
    }
}
