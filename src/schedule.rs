//! Day scheduling: which days to scrape and how one day is collected.
//!
//! A day is scraped by fetching its scoreboard, then every listed box score
//! with at most `concurrency` requests in flight. Games that fail to fetch
//! are logged and left out. A day whose scoreboard cannot be fetched is not
//! written, so the next run picks it up again.

use crate::error::{CacheError, ConfigError, FetchError};
use crate::models::{DayStats, GameBoxScore};
use crate::net::PageFetch;
use crate::outputs::json;
use crate::scrapers::Source;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// Parse a day given as `MM-DD-YYYY` or `YYYYMMDD`.
pub fn parse_day(text: &str) -> Result<NaiveDate, ConfigError> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%m-%d-%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y%m%d"))
        .map_err(|_| ConfigError::Date(text.to_string()))
}

/// Every day from `start` up to, but not including, `today`.
pub fn season_days(start: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day < today).collect()
}

/// Days without a cache file in `stats_dir`, in order.
pub fn missing_days(stats_dir: &Path, days: &[NaiveDate]) -> Vec<NaiveDate> {
    days.iter()
        .copied()
        .filter(|day| !json::day_exists(stats_dir, *day))
        .collect()
}

/// Scrapes days of one source into one stats directory.
#[derive(Debug)]
pub struct Scheduler<'a, F> {
    pub source: Source,
    pub fetch: &'a F,
    pub stats_dir: &'a Path,
    pub concurrency: usize,
}

impl<F: PageFetch> Scheduler<'_, F> {
    /// Fetch and parse every game of `day`.
    #[instrument(level = "info", skip(self), fields(source = self.source.name()))]
    pub async fn collect_day(&self, day: NaiveDate) -> Result<DayStats, FetchError> {
        let urls = self.source.box_urls(self.fetch, day).await?;
        let source = self.source;
        let fetch = self.fetch;

        let games: Vec<Option<GameBoxScore>> = stream::iter(urls.iter())
            .map(|url| async move {
                match source.game_stats(fetch, url).await {
                    Ok(game) => Some(game),
                    Err(e) => {
                        error!(%url, error = %e, "Box score fetch failed; skipping game");
                        None
                    }
                }
            })
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;

        let stats: DayStats = games
            .into_iter()
            .flatten()
            .map(|game| (game.game_id, game.players))
            .collect();
        info!(
            indexed = urls.len(),
            collected = stats.len(),
            without_players = stats.values().filter(|game| game.is_empty()).count(),
            failed = urls.len().saturating_sub(stats.len()),
            "Collected day"
        );
        Ok(stats)
    }

    /// Fill the first `count` days between `season_start` and yesterday that
    /// have no cache file. Returns the days written.
    #[instrument(level = "info", skip(self), fields(source = self.source.name()))]
    pub async fn update_missing(
        &self,
        season_start: NaiveDate,
        today: NaiveDate,
        count: usize,
    ) -> Result<Vec<NaiveDate>, CacheError> {
        let missing = missing_days(self.stats_dir, &season_days(season_start, today));
        info!(missing = missing.len(), "Found days without stats");

        let mut written = Vec::new();
        for day in missing.into_iter().take(count) {
            match self.collect_day(day).await {
                Ok(stats) => {
                    json::write_day(self.stats_dir, day, &stats).await?;
                    written.push(day);
                }
                Err(e) => {
                    warn!(%day, error = %e, "Scoreboard fetch failed; leaving day for a later run");
                }
            }
        }
        Ok(written)
    }

    /// Scrape one day. An existing cache file is returned as is unless
    /// `force` is set.
    #[instrument(level = "info", skip(self), fields(source = self.source.name()))]
    pub async fn refresh_day(
        &self,
        day: NaiveDate,
        force: bool,
    ) -> Result<DayStats, Box<dyn Error>> {
        if !force && json::day_exists(self.stats_dir, day) {
            let stats = json::read_day(self.stats_dir, day).await?;
            info!(%day, games = stats.len(), "Day already cached; use --force to refetch");
            return Ok(stats);
        }
        let stats = self.collect_day(day).await?;
        json::write_day(self.stats_dir, day, &stats).await?;
        Ok(stats)
    }
}
