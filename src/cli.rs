//! Command-line interface definitions for box_score_stats.
//!
//! Flags override values from the optional YAML config file. The stats
//! directory and config path can also come from the environment.

use crate::scrapers::Source;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Fill the next three missing days from CBS
/// box_score_stats --source cbs -n 3
///
/// # Re-scrape one Baseball-Reference day, overwriting its file
/// box_score_stats --source br --date 20230718 --force
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Website to scrape
    #[arg(short, long, value_enum)]
    pub source: Source,

    /// Number of missing days to fill
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Scrape only this day (YYYYMMDD or MM-DD-YYYY)
    #[arg(short, long)]
    pub date: Option<String>,

    /// First day of the season (MM-DD-YYYY)
    #[arg(long)]
    pub season_start: Option<String>,

    /// Directory holding the per-day JSON files
    #[arg(long, env = "BOX_SCORE_STATS_DIR")]
    pub stats_dir: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long, env = "BOX_SCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing day file when --date is given
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "box_score_stats",
            "--source",
            "br",
            "--date",
            "20230718",
            "--force",
        ]);

        assert_eq!(cli.source, Source::BaseballReference);
        assert_eq!(cli.date.as_deref(), Some("20230718"));
        assert!(cli.force);
        assert_eq!(cli.count, 1);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["box_score_stats", "-s", "cbs", "-n", "5"]);

        assert_eq!(cli.source, Source::Cbs);
        assert_eq!(cli.count, 5);
        assert!(cli.date.is_none());
        assert!(!cli.force);
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["box_score_stats", "--source", "espn"]).is_err());
    }
}
