//! Error types for box-score extraction and its collaborators.
//!
//! The parsing core reports three kinds of failure:
//!
//! - [`DecodeError`]: a stat cell or marker did not have the expected textual form
//! - [`IdentifierError`]: a player link did not follow the source's URL convention
//! - [`StructuralError`]: a page lacked the tables/sections an adapter needs
//!
//! Row-level errors skip the row; structural errors degrade to an empty page.
//! Stolen-base attribution never errors: unresolvable runners are dropped.

use thiserror::Error;

/// Malformed numeric, innings or marker text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected an integer, found {0:?}")]
    NotANumber(String),

    #[error("innings value {0:?} has a non-numeric whole part")]
    BadInnings(String),

    #[error("innings value {text:?} has partial digit {partial:?} (expected 0, 1 or 2)")]
    BadPartialInning { text: String, partial: String },

    #[error("row is missing the {0:?} column")]
    MissingColumn(String),
}

/// A hyperlink that does not match the source's player-link convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("link {0:?} has no trailing slug")]
    NoSlug(String),

    #[error("link {0:?} has fewer than two path segments")]
    TooShort(String),

    #[error("link {href:?} has non-numeric player id {segment:?}")]
    NotNumeric { href: String, segment: String },
}

/// A page without the structure an adapter expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("found {found} statistic tables, need at least {expected}")]
    TooFewTables { found: usize, expected: usize },

    #[error("could not determine the teams from {0:?}")]
    NoTeams(String),
}

/// Failures raised while extracting one row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// Page retrieval failure reported by the fetch collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Problems loading the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid date {0:?} (expected MM-DD-YYYY or YYYYMMDD)")]
    Date(String),
}

/// Problems reading or writing day cache files.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot serialize day {day}: {source}")]
    Serialize {
        day: String,
        source: serde_json::Error,
    },
}
