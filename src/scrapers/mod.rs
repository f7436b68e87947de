//! Box-score sources.
//!
//! Each source module knows one site's page layout and follows the same
//! pattern:
//!
//! 1. **Scoreboard**: `scoreboard_url(day)` and `parse_scoreboard(html)` list
//!    a day's box-score URLs
//! 2. **Extraction**: `extract(...)` turns one box-score page into
//!    [`GameFragments`]
//!
//! # Supported Sources
//!
//! | Source | Module | Player ids | Notes |
//! |--------|--------|------------|-------|
//! | Baseball-Reference | [`bbref`] | `troutmi01` | Tables are inside HTML comments |
//! | CBS Sports | [`cbs`] | numeric | Stolen bases only as prose |
//!
//! [`Source`] dispatches to the right module. Parsing is synchronous and
//! does no I/O; fetching goes through a [`PageFetch`].

use crate::boxscore;
use crate::error::FetchError;
use crate::models::{GameBoxScore, GameFragments};
use crate::net::PageFetch;
use chrono::NaiveDate;
use clap::ValueEnum;
use tracing::{debug, info, instrument, warn};

pub mod bbref;
pub mod cbs;
pub mod tables;

/// A box-score website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Source {
    /// CBS Sports
    Cbs,
    /// Baseball-Reference
    #[value(name = "br")]
    BaseballReference,
}

impl Source {
    /// Short name used on the command line and in logs.
    pub fn name(self) -> &'static str {
        match self {
            Source::Cbs => "cbs",
            Source::BaseballReference => "br",
        }
    }

    /// URL of the page listing `day`'s box scores.
    pub fn scoreboard_url(self, day: NaiveDate) -> String {
        match self {
            Source::Cbs => cbs::scoreboard_url(day),
            Source::BaseballReference => bbref::scoreboard_url(day),
        }
    }

    /// Absolute box-score URLs found on a scoreboard page, deduplicated in
    /// page order.
    pub fn parse_scoreboard(self, html: &str) -> Vec<String> {
        match self {
            Source::Cbs => cbs::parse_scoreboard(html),
            Source::BaseballReference => bbref::parse_scoreboard(html),
        }
    }

    /// Key under which a game is stored in the day file.
    pub fn game_id(self, url: &str) -> String {
        match self {
            Source::Cbs => cbs::game_id(url),
            Source::BaseballReference => bbref::game_id(url),
        }
    }

    /// Run the source's adapter over one box-score page.
    ///
    /// # Arguments
    ///
    /// * `url` - The page's URL (CBS reads the teams from it)
    /// * `html` - The fetched page text
    ///
    /// # Returns
    ///
    /// Batting, pitching and baserunning fragments. Pages without the
    /// expected structure give empty fragments.
    pub fn extract(self, url: &str, html: &str) -> GameFragments {
        match self {
            Source::Cbs => cbs::extract(url, html),
            Source::BaseballReference => bbref::extract(html),
        }
    }

    /// Parse a fetched box-score page into the game's box score.
    pub fn parse_game(self, url: &str, html: &str) -> GameBoxScore {
        let fragments = self.extract(url, html);
        if fragments.is_empty() {
            warn!(%url, source = self.name(), "Box score page had no player stats");
        }
        boxscore::from_fragments(self.game_id(url), &fragments)
    }

    /// Fetch a day's scoreboard and list its box-score URLs.
    #[instrument(level = "info", skip(self, fetch), fields(source = self.name()))]
    pub async fn box_urls<F: PageFetch>(
        self,
        fetch: &F,
        day: NaiveDate,
    ) -> Result<Vec<String>, FetchError> {
        let url = self.scoreboard_url(day);
        let html = fetch.fetch(&url).await?;
        let urls = self.parse_scoreboard(&html);
        info!(%day, count = urls.len(), "Indexed box scores");
        Ok(urls)
    }

    /// Fetch and parse one box score.
    #[instrument(level = "info", skip(self, fetch), fields(source = self.name()))]
    pub async fn game_stats<F: PageFetch>(
        self,
        fetch: &F,
        url: &str,
    ) -> Result<GameBoxScore, FetchError> {
        let html = fetch.fetch(url).await?;
        let game = self.parse_game(url, &html);
        let batters = game
            .players
            .iter()
            .filter(|(_, record)| record.batting.is_some())
            .count();
        debug!(
            game_id = %game.game_id,
            players = game.players.len(),
            batters,
            "Parsed box score"
        );
        Ok(game)
    }
}
