//! YAML run configuration.
//!
//! Every field is optional in the file; missing ones take the defaults
//! below. Command-line flags are applied on top in `main`.
//!
//! ```yaml
//! season_start: 03-30-2023
//! stats_dir:
//!   cbs: cbs_stats
//!   br: br_stats
//! concurrency: 4
//! timeout_secs: 15
//! max_retries: 3
//! ```

use crate::error::ConfigError;
use crate::schedule::parse_day;
use crate::scrapers::Source;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_SEASON_START: &str = "03-30-2023";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// First day of the season, `MM-DD-YYYY`.
    pub season_start: String,
    pub stats_dir: StatsDirs,
    /// Box-score pages fetched at once.
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub user_agent: String,
}

/// Day cache directory for each source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsDirs {
    pub cbs: PathBuf,
    pub br: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season_start: DEFAULT_SEASON_START.to_string(),
            stats_dir: StatsDirs::default(),
            concurrency: 4,
            timeout_secs: 15,
            max_retries: 3,
            user_agent: concat!("box_score_stats/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for StatsDirs {
    fn default() -> Self {
        Self {
            cbs: PathBuf::from("cbs_stats"),
            br: PathBuf::from("br_stats"),
        }
    }
}

impl Config {
    /// Cache directory for `source`.
    pub fn stats_dir(&self, source: Source) -> &Path {
        match source {
            Source::Cbs => &self.stats_dir.cbs,
            Source::BaseballReference => &self.stats_dir.br,
        }
    }

    /// Override the cache directory for `source`, e.g. from `--stats-dir`.
    pub fn set_stats_dir(&mut self, source: Source, dir: PathBuf) {
        match source {
            Source::Cbs => self.stats_dir.cbs = dir,
            Source::BaseballReference => self.stats_dir.br = dir,
        }
    }

    /// Parsed `season_start`.
    pub fn season_start(&self) -> Result<NaiveDate, ConfigError> {
        parse_day(&self.season_start)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load a config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Yaml`] if it is not valid YAML for [`Config`].
#[instrument(level = "info")]
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        season_start = %config.season_start,
        concurrency = config.concurrency,
        "Loaded configuration"
    );
    Ok(config)
}
