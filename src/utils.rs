//! Utility functions for logging and file system checks.

use crate::error::CacheError;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const WRITE_CHECK_FILE: &str = ".box_score_stats.write_check";

/// Truncate a string for logging purposes.
///
/// Cuts at `max` bytes, backing off to a char boundary, and appends how
/// many bytes were dropped. Used to preview stolen-base prose in logs.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Create the stats directory if needed and check that files can be
/// written to it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), CacheError> {
    let io = |source| CacheError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::create_dir_all(path).await.map_err(io)?;

    let check = path.join(WRITE_CHECK_FILE);
    fs::write(&check, b"").await.map_err(io)?;
    fs::remove_file(&check).await.map_err(io)?;
    info!("Stats directory is writable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Betts 2, Freeman", 100), "Betts 2, Freeman");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let prose = "Betts ".repeat(50);
        let result = truncate_for_log(&prose, 12);
        assert_eq!(result, "Betts Betts …(+288 bytes)");
    }

    #[test]
    fn test_truncate_for_log_char_boundary() {
        let result = truncate_for_log("2·SB, HR", 2);
        assert!(result.starts_with('2'));
        assert!(result.contains("bytes)"));
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cbs_stats").join("2023");
        ensure_writable_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
        assert!(!nested.join(WRITE_CHECK_FILE).exists());
    }
}
