//! # box_score_stats
//!
//! Scrapes MLB box scores from Baseball-Reference or CBS Sports and turns
//! each game into a per-player record of batting, pitching and baserunning
//! stats, cached as one JSON file per day.
//!
//! ## Usage
//!
//! ```sh
//! box_score_stats --source br -n 7
//! box_score_stats --source cbs --date 20230718 --force
//! ```
//!
//! ## Architecture
//!
//! 1. **Scheduling**: pick the days whose file is missing (or the one given day)
//! 2. **Indexing**: list a day's box-score URLs from the source's scoreboard
//! 3. **Extraction**: parse each page into batting, pitching and baserunning
//!    fragments (games fetched concurrently)
//! 4. **Merging**: fold the fragments into one record per player
//! 5. **Output**: write `<stats_dir>/a<YYYYMMDD>.json`

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod boxscore;
mod cli;
mod config;
mod decode;
mod error;
mod ids;
mod merge;
mod models;
mod net;
mod outputs;
mod schedule;
mod scrapers;
mod utils;

use cli::Cli;
use config::{Config, load_config};
use net::{HttpFetch, RetryFetch};
use schedule::{Scheduler, parse_day};
use utils::ensure_writable_dir;

/// Initial backoff before the first retry of a failed fetch.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("box_score_stats starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Config, then CLI overrides ----
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(season_start) = &args.season_start {
        config.season_start = season_start.clone();
    }
    if let Some(dir) = &args.stats_dir {
        config.set_stats_dir(args.source, dir.clone());
    }
    let stats_dir = config.stats_dir(args.source);

    if let Err(e) = ensure_writable_dir(stats_dir).await {
        error!(
            path = %stats_dir.display(),
            error = %e,
            "Stats directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let fetch = RetryFetch::new(
        HttpFetch::new(config.timeout(), &config.user_agent)?,
        config.max_retries,
        RETRY_BASE_DELAY,
    );
    let scheduler = Scheduler {
        source: args.source,
        fetch: &fetch,
        stats_dir,
        concurrency: config.concurrency,
    };

    match &args.date {
        Some(date) => {
            let day = parse_day(date)?;
            let stats = scheduler.refresh_day(day, args.force).await?;
            info!(%day, games = stats.len(), "Day complete");
        }
        None => {
            let season_start = config.season_start()?;
            let today = Local::now().date_naive();
            let written = scheduler
                .update_missing(season_start, today, args.count)
                .await?;
            info!(
                requested = args.count,
                written = written.len(),
                days = ?written,
                "Missing days filled"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        source = args.source.name(),
        "Execution complete"
    );

    Ok(())
}
