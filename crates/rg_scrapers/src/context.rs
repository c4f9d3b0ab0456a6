use rg_core::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Deadline carried by every fetch. Work still pending when it passes is
/// dropped and the fetch fails with [`Error::Timeout`].
#[derive(Debug, Clone, Copy)]
pub struct ScrapeContext {
    deadline: Instant,
    budget: Duration,
}

impl ScrapeContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            budget: timeout,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.budget)),
        }
    }
}
