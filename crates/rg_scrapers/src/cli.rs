use clap::{Args, Subcommand};
use rg_core::Result;
use std::time::Duration;

use crate::context::ScrapeContext;
use crate::manager::ScraperManager;

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Force a refresh of one source, or `all`, and print the feed
    Scrape {
        /// Source key (e.g. aws, nodeweekly) or `all`
        source: String,
    },
    /// List available sources
    List,
}

pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager, timeout: Duration) -> Result<()> {
    match args.command {
        ScraperCommands::Scrape { source } => {
            let ctx = ScrapeContext::with_timeout(timeout);
            if source == "all" {
                let mut failures = 0;
                for (key, result) in manager.scrape_all(&ctx).await {
                    match result {
                        Ok(xml) => println!("✅ {} ({} bytes)", key, xml.len()),
                        Err(e) => {
                            failures += 1;
                            eprintln!("❌ {}: {}", key, e);
                        }
                    }
                }
                if failures > 0 {
                    eprintln!("{} source(s) failed", failures);
                }
            } else {
                let scraper = manager.get_scraper(&source)?;
                let xml = scraper.scrape(&ctx, true).await?;
                println!("{}", xml);
            }
        }
        ScraperCommands::List => manager.list_scrapers(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{descriptor, MockExtractor};
    use rg_core::{Error, FeedCache};
    use rg_storage::MemoryCache;
    use std::sync::Arc;

    fn manager(extractor: Arc<MockExtractor>) -> (ScraperManager, Arc<dyn FeedCache>) {
        let cache: Arc<dyn FeedCache> = Arc::new(MemoryCache::new());
        (ScraperManager::new(vec![descriptor("aws")], cache.clone(), extractor), cache)
    }

    #[tokio::test]
    async fn test_scrape_single_source_writes_cache() {
        let extractor = Arc::new(MockExtractor::returning(vec![]));
        let (manager, cache) = manager(extractor.clone());
        let args = ScraperArgs {
            command: ScraperCommands::Scrape { source: "aws".to_string() },
        };
        handle_command(args, &manager, Duration::from_secs(5)).await.unwrap();
        assert_eq!(extractor.calls(), 1);
        assert!(cache.get("aws").await.is_some());
    }

    #[tokio::test]
    async fn test_scrape_unknown_source() {
        let (manager, _) = manager(Arc::new(MockExtractor::returning(vec![])));
        let args = ScraperArgs {
            command: ScraperCommands::Scrape { source: "slashdot".to_string() },
        };
        let err = handle_command(args, &manager, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, Error::UnknownSource(_)));
    }

    #[tokio::test]
    async fn test_list_does_not_scrape() {
        let extractor = Arc::new(MockExtractor::returning(vec![]));
        let (manager, _) = manager(extractor.clone());
        let args = ScraperArgs { command: ScraperCommands::List };
        handle_command(args, &manager, Duration::from_secs(5)).await.unwrap();
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_scrape_all_tolerates_failures() {
        let (manager, _) = manager(Arc::new(MockExtractor::failing("offline")));
        let args = ScraperArgs {
            command: ScraperCommands::Scrape { source: "all".to_string() },
        };
        assert!(handle_command(args, &manager, Duration::from_secs(5)).await.is_ok());
    }
}
