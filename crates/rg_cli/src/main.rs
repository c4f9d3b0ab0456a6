use anyhow::{bail, Context};
use clap::Parser;
use rg_core::FeedCache;
use rg_scrapers::cli::{handle_command, ScraperArgs, ScraperCommands};
use rg_scrapers::scrapers::sources;
use rg_scrapers::{init_logging, Cadence, Extractor, HtmlExtractor, Scheduler, ScraperManager, SourceDescriptor};
use rg_web::{create_app, AppState};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A bare number is seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds = total_seconds
                        .checked_add(num)
                        .ok_or_else(|| "Duration is too large".to_string())?;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrapes tech news sites and serves them as RSS feeds", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, env = "RG_LOG_LEVEL", default_value = "info")]
    log_level: String,
    /// Feed cache backend. Available backends: memory (default)
    #[arg(long, global = true, env = "RG_CACHE", default_value = "memory")]
    cache: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the feeds over HTTP and refresh them on a schedule
    Serve(ServeArgs),
    /// Force a refresh of one source (or `all`) and print the result
    Scrape {
        /// Source key, or `all`
        source: String,
        /// Deadline for the extraction (e.g. 90s, 10m)
        #[arg(long, default_value = "10m")]
        timeout: HumanDuration,
    },
    /// List the available sources
    List,
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "RG_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,
    /// Deadline for a fetch triggered by a request on a cold cache
    #[arg(long, env = "RG_REQUEST_TIMEOUT", default_value = "60s")]
    request_timeout: HumanDuration,
    /// Deadline for each scheduled refresh
    #[arg(long, env = "RG_JOB_TIMEOUT", default_value = "10m")]
    job_timeout: HumanDuration,
    /// Cron expression for every source, five or six fields (default: daily at midnight UTC)
    #[arg(long, env = "RG_SCHEDULE", conflicts_with = "every")]
    schedule: Option<String>,
    /// Fixed refresh period for every source (e.g. 30m, 1h15m)
    #[arg(long, env = "RG_EVERY")]
    every: Option<HumanDuration>,
    /// Only serve these sources (comma separated keys)
    #[arg(long, env = "RG_SOURCES", value_delimiter = ',')]
    sources: Vec<String>,
    /// Do not refresh every source at startup
    #[arg(long)]
    no_warm: bool,
}

fn select_sources(all: Vec<SourceDescriptor>, wanted: &[String]) -> anyhow::Result<Vec<SourceDescriptor>> {
    if wanted.is_empty() {
        return Ok(all);
    }
    for key in wanted {
        if !all.iter().any(|d| &d.key == key) {
            let known: Vec<&str> = all.iter().map(|d| d.key.as_str()).collect();
            bail!("unknown source `{}` (available: {})", key, known.join(", "));
        }
    }
    Ok(all.into_iter().filter(|d| wanted.contains(&d.key)).collect())
}

fn cadence_override(schedule: Option<&str>, every: Option<&HumanDuration>) -> anyhow::Result<Option<Cadence>> {
    Ok(match (schedule, every) {
        (Some(expr), _) => Some(Cadence::cron(expr)?),
        (None, Some(period)) => Some(Cadence::every(period.0)?),
        (None, None) => None,
    })
}

async fn serve(args: ServeArgs, cache: Arc<dyn FeedCache>, extractor: Arc<dyn Extractor>) -> anyhow::Result<()> {
    let cadence = cadence_override(args.schedule.as_deref(), args.every.as_ref())?;
    let descriptors = select_sources(sources::descriptors(), &args.sources)?
        .into_iter()
        .map(|d| match &cadence {
            Some(c) => d.with_cadence(c.clone()),
            None => d,
        })
        .collect();

    let manager = Arc::new(ScraperManager::new(descriptors, cache, extractor));
    info!("🦗 Sources initialized: {}", manager.keys().join(", "));

    let mut scheduler = Scheduler::new(args.job_timeout.0).with_warm_start(!args.no_warm);
    for scraper in manager.scrapers() {
        scheduler.add_job(scraper.clone(), scraper.descriptor().cadence.clone());
    }
    scheduler.start();

    let state = AppState::new(manager.clone())
        .with_request_timeout(args.request_timeout.0)
        .with_status(scheduler.status());
    let listener = tokio::net::TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("🚀 Serving feeds on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Waiting for running refreshes to finish");
    scheduler.stop().await;
    served.context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cache = rg_storage::create_cache(&cli.cache)?;
    info!("💾 Feed cache ready (using {})", cli.cache);
    let extractor: Arc<dyn Extractor> = Arc::new(HtmlExtractor::new()?);

    match cli.command {
        Commands::Serve(args) => serve(args, cache, extractor).await,
        Commands::Scrape { source, timeout } => {
            let manager = ScraperManager::new(sources::descriptors(), cache, extractor);
            let args = ScraperArgs {
                command: ScraperCommands::Scrape { source },
            };
            handle_command(args, &manager, timeout.0).await?;
            Ok(())
        }
        Commands::List => {
            ScraperManager::new(sources::descriptors(), cache, extractor).list_scrapers();
            Ok(())
        }
    }
}
