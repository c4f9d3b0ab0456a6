use futures::future::join_all;
use rg_core::{Error, FeedCache, Result};
use std::sync::Arc;
use tracing::info;

use crate::context::ScrapeContext;
use crate::extractor::Extractor;
use crate::scrapers::{Scraper, SourceScraper};
use crate::source::SourceDescriptor;

type SharedScraper = Arc<dyn Scraper>;

/// Registry of configured sources, all sharing one cache and one extractor.
pub struct ScraperManager {
    cache: Arc<dyn FeedCache>,
    scrapers: Vec<SharedScraper>,
}

impl ScraperManager {
    pub fn new(
        descriptors: Vec<SourceDescriptor>,
        cache: Arc<dyn FeedCache>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let scrapers = descriptors
            .into_iter()
            .map(|d| Arc::new(SourceScraper::new(d, cache.clone(), extractor.clone())) as SharedScraper)
            .collect();
        Self { cache, scrapers }
    }

    /// Registers an extra scraper. A scraper with the same key replaces the
    /// existing one.
    pub fn add_scraper(&mut self, scraper: SharedScraper) {
        self.scrapers.retain(|s| s.key() != scraper.key());
        self.scrapers.push(scraper);
    }

    pub fn get_scraper(&self, key: &str) -> Result<SharedScraper> {
        self.scrapers
            .iter()
            .find(|s| s.key() == key)
            .cloned()
            .ok_or_else(|| Error::UnknownSource(key.to_string()))
    }

    pub fn scrapers(&self) -> &[SharedScraper] {
        &self.scrapers
    }

    pub fn keys(&self) -> Vec<&str> {
        self.scrapers.iter().map(|s| s.key()).collect()
    }

    pub fn cache(&self) -> &Arc<dyn FeedCache> {
        &self.cache
    }

    /// Forces a refresh of every source concurrently. Results come back in
    /// registration order, one per source.
    pub async fn scrape_all(&self, ctx: &ScrapeContext) -> Vec<(String, Result<String>)> {
        info!("🦗 Refreshing {} sources", self.scrapers.len());
        let futures = self.scrapers.iter().map(|scraper| async move {
            (scraper.key().to_string(), scraper.scrape(ctx, true).await)
        });
        join_all(futures).await
    }

    pub fn list_scrapers(&self) {
        println!("Available sources:");
        for scraper in &self.scrapers {
            let d = scraper.descriptor();
            println!("  - {:<14} {} ({})", d.key, d.title, d.target);
        }
    }
}
