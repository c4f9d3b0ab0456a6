use rg_scrapers::{ScraperManager, StatusBoard};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AppState {
    pub manager: Arc<ScraperManager>,
    /// Deadline for a fetch triggered by a request that missed the cache.
    pub request_timeout: Duration,
    /// Present when the scheduler runs in this process.
    pub status: Option<StatusBoard>,
}

impl AppState {
    pub fn new(manager: Arc<ScraperManager>) -> Self {
        Self {
            manager,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            status: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_status(mut self, status: StatusBoard) -> Self {
        self.status = Some(status);
        self
    }
}
