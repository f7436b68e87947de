//! JSON day cache.
//!
//! One file per scraped day, named `a<YYYYMMDD>.json`, holding a mapping of
//! game id to [`BoxScoreRecord`](crate::models::BoxScoreRecord). A day whose
//! file exists counts as done.

use crate::error::CacheError;
use crate::models::DayStats;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File name for `day`, e.g. `a20230718.json`.
pub fn day_file_name(day: NaiveDate) -> String {
    format!("a{}.json", day.format("%Y%m%d"))
}

/// Full path of `day`'s file inside `stats_dir`.
pub fn day_path(stats_dir: &Path, day: NaiveDate) -> PathBuf {
    stats_dir.join(day_file_name(day))
}

/// Whether `day` has already been scraped into `stats_dir`.
pub fn day_exists(stats_dir: &Path, day: NaiveDate) -> bool {
    day_path(stats_dir, day).exists()
}

/// Write a day's box scores, replacing any existing file.
///
/// # Arguments
///
/// * `stats_dir` - The source's cache directory (must already exist)
/// * `day` - The day the games were played
/// * `stats` - Game id to box score
///
/// # Returns
///
/// The path written.
///
/// # Errors
///
/// Returns [`CacheError`] if serialization or the write fails.
#[instrument(level = "info", skip_all, fields(stats_dir = %stats_dir.display(), %day))]
pub async fn write_day(
    stats_dir: &Path,
    day: NaiveDate,
    stats: &DayStats,
) -> Result<PathBuf, CacheError> {
    let json = serde_json::to_string(stats).map_err(|source| CacheError::Serialize {
        day: day.to_string(),
        source,
    })?;

    let path = day_path(stats_dir, day);
    fs::write(&path, json).await.map_err(|source| CacheError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), games = stats.len(), "Wrote day stats");
    Ok(path)
}

/// Read a previously written day.
///
/// # Errors
///
/// Returns [`CacheError::Io`] if the file is missing or unreadable and
/// [`CacheError::Serialize`] if it is not a valid day file.
pub async fn read_day(stats_dir: &Path, day: NaiveDate) -> Result<DayStats, CacheError> {
    let path = day_path(stats_dir, day);
    let io = |source| CacheError::Io {
        path: path.display().to_string(),
        source,
    };
    let text = fs::read_to_string(&path).await.map_err(io)?;
    serde_json::from_str(&text).map_err(|source| CacheError::Serialize {
        day: day.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoxScoreRecord, PlayerGameRecord, PlayerId, StatLine};
    use std::collections::BTreeMap;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, 18).unwrap()
    }

    #[test]
    fn test_day_file_name() {
        assert_eq!(day_file_name(day()), "a20230718.json");
        assert_eq!(
            day_path(Path::new("cbs_stats"), day()),
            PathBuf::from("cbs_stats/a20230718.json")
        );
    }

    #[tokio::test]
    async fn test_write_then_read_day() {
        let dir = tempfile::tempdir().unwrap();
        let record = PlayerGameRecord {
            name: "L. Webb".to_string(),
            team: "SF".to_string(),
            pitching: Some(StatLine::from([("Outs".to_string(), 20)])),
            ..PlayerGameRecord::default()
        };
        let mut stats = DayStats::new();
        stats.insert(
            "MLB_20230718_SF@CIN_2".to_string(),
            BoxScoreRecord::from(BTreeMap::from([(PlayerId::new("1670417"), record)])),
        );

        assert!(!day_exists(dir.path(), day()));
        let path = write_day(dir.path(), day(), &stats).await.unwrap();
        assert!(path.ends_with("a20230718.json"));
        assert!(day_exists(dir.path(), day()));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["MLB_20230718_SF@CIN_2"]["1670417"]["pitching"]["Outs"], 20);
        assert!(raw["MLB_20230718_SF@CIN_2"]["1670417"].get("batting").is_none());

        assert_eq!(read_day(dir.path(), day()).await.unwrap(), stats);
    }

    #[tokio::test]
    async fn test_read_missing_day() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_day(dir.path(), day()).await,
            Err(CacheError::Io { .. })
        ));
    }
}
