//! Periodic forced refresh of every registered source.
//!
//! Each job gets its own task that sleeps until the next cadence tick, runs a
//! forced scrape under a fresh deadline and reports a [`JobOutcome`]. Runs for
//! one source never overlap: a tick that comes due while the previous run is
//! still going is skipped. Different sources tick independently.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::context::ScrapeContext;
use crate::scrapers::Scraper;
use crate::source::Cadence;

pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const OUTCOME_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded { bytes: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded { .. })
    }
}

/// Last outcome per source.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<HashMap<String, JobOutcome>>>,
}

impl StatusBoard {
    pub async fn record(&self, outcome: JobOutcome) {
        self.inner.write().await.insert(outcome.source.clone(), outcome);
    }

    pub async fn get(&self, source: &str) -> Option<JobOutcome> {
        self.inner.read().await.get(source).cloned()
    }

    pub async fn snapshot(&self) -> BTreeMap<String, JobOutcome> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

struct Job {
    scraper: Arc<dyn Scraper>,
    cadence: Cadence,
}

#[derive(Clone)]
struct Runner {
    job_timeout: Duration,
    status: StatusBoard,
    outcomes: broadcast::Sender<JobOutcome>,
}

pub struct Scheduler {
    jobs: Vec<Job>,
    runner: Runner,
    warm_start: bool,
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(job_timeout: Duration) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        let (shutdown, _) = watch::channel(false);
        Self {
            jobs: Vec::new(),
            runner: Runner {
                job_timeout,
                status: StatusBoard::default(),
                outcomes,
            },
            warm_start: false,
            shutdown,
            handles: Vec::new(),
        }
    }

    /// Runs every job once right away when the scheduler starts.
    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    pub fn add_job(&mut self, scraper: Arc<dyn Scraper>, cadence: Cadence) {
        info!(source = scraper.key(), cadence = ?cadence, "Job added to scheduler");
        self.jobs.push(Job { scraper, cadence });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobOutcome> {
        self.runner.outcomes.subscribe()
    }

    pub fn status(&self) -> StatusBoard {
        self.runner.status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Scheduler already started");
            return;
        }
        self.shutdown.send_replace(false);

        for job in &self.jobs {
            let scraper = job.scraper.clone();
            let cadence = job.cadence.clone();
            let runner = self.runner.clone();
            let shutdown = self.shutdown.subscribe();
            let warm = self.warm_start;
            self.handles.push(tokio::spawn(async move {
                run_loop(scraper, cadence, runner, shutdown, warm).await
            }));
        }
        info!("⏰ Scheduler started with {} jobs", self.jobs.len());
    }

    /// Stops ticking and waits for runs already in flight to finish.
    pub async fn stop(&mut self) {
        self.shutdown.send_replace(true);
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "Scheduler task ended abnormally");
            }
        }
        info!("Scheduler stopped");
    }
}

async fn run_loop(
    scraper: Arc<dyn Scraper>,
    cadence: Cadence,
    runner: Runner,
    mut shutdown: watch::Receiver<bool>,
    warm: bool,
) {
    if warm && !*shutdown.borrow() {
        runner.run(&scraper).await;
    }

    match cadence {
        Cadence::Every(period) if period.is_zero() => {
            warn!(source = scraper.key(), "Refresh period is zero, not scheduling");
        }
        Cadence::Every(period) => {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        runner.run(&scraper).await;
                        // Ticks that came due during the run are dropped.
                        ticker.reset();
                    }
                }
            }
        }
        cron @ Cadence::Cron { .. } => loop {
            let Some(wait) = cron.until_next() else {
                warn!(source = scraper.key(), "Cron schedule has no upcoming tick");
                break;
            };
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(wait) => runner.run(&scraper).await,
            }
        },
    }
}

impl Runner {
    async fn run(&self, scraper: &Arc<dyn Scraper>) {
        let source = scraper.key().to_string();
        let started_at = Utc::now();
        let started = Instant::now();
        info!(source = %source, "Running scheduled refresh");

        // A separate task turns a panic inside the scrape into a failed run.
        let task = {
            let scraper = scraper.clone();
            let timeout = self.job_timeout;
            tokio::spawn(async move {
                let ctx = ScrapeContext::with_timeout(timeout);
                scraper.scrape(&ctx, true).await
            })
        };
        let status = match task.await {
            Ok(Ok(xml)) => JobStatus::Succeeded { bytes: xml.len() },
            Ok(Err(e)) => JobStatus::Failed { error: e.to_string() },
            Err(e) => JobStatus::Failed {
                error: format!("job panicked: {}", e),
            },
        };

        let outcome = JobOutcome {
            source,
            started_at,
            elapsed_ms: started.elapsed().as_millis() as u64,
            status,
        };
        match &outcome.status {
            JobStatus::Succeeded { bytes } => {
                info!(source = %outcome.source, bytes, elapsed_ms = outcome.elapsed_ms, "✅ Scheduled refresh done")
            }
            JobStatus::Failed { error } => {
                error!(source = %outcome.source, error = %error, elapsed_ms = outcome.elapsed_ms, "Scheduled refresh failed")
            }
        }

        self.status.record(outcome.clone()).await;
        // No subscribers is fine.
        let _ = self.outcomes.send(outcome);
    }
}
