pub mod cli;
pub mod context;
pub mod extractor;
pub mod logging;
pub mod manager;
pub mod normalize;
pub mod scheduler;
pub mod scrapers;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use context::ScrapeContext;
pub use extractor::{ExtractionScript, Extractor, FieldRule, HtmlExtractor};
pub use logging::init_logging;
pub use manager::ScraperManager;
pub use scheduler::{JobOutcome, JobStatus, Scheduler, StatusBoard, DEFAULT_JOB_TIMEOUT};
pub use scrapers::{Scraper, SourceScraper};
pub use source::{Cadence, SourceDescriptor};

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::ScrapeContext;
    pub use rg_core::{Error, Result};
}
