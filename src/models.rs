//! Data models for extracted and merged box-score statistics.
//!
//! This module defines the core data structures used throughout the application:
//! - [`StatFragment`]: one category of one player's stats, as read from one page region
//! - [`GameFragments`]: everything a source adapter extracted from one page
//! - [`PlayerGameRecord`]: one player's merged stats for a game
//! - [`BoxScoreRecord`] / [`GameBoxScore`]: the per-game output handed to the cache
//!
//! Serialized field names are the ones written to the day cache files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stat names used as keys in stat lines.
pub mod stat {
    pub const AT_BATS: &str = "AB";
    pub const HITS: &str = "H";
    pub const RUNS: &str = "R";
    pub const RBI: &str = "RBI";
    pub const HOME_RUNS: &str = "HR";
    pub const STOLEN_BASES: &str = "SB";
    pub const WIN: &str = "Win";
    pub const SAVE: &str = "Save";
    pub const OUTS: &str = "Outs";
    pub const EARNED_RUNS: &str = "ER";
    pub const WALKS: &str = "BB";
    pub const STRIKEOUTS: &str = "SO";
    pub const WALKS_PLUS_HITS: &str = "WH";
}

/// Stat-name to count mapping for one category.
pub type StatLine = BTreeMap<String, u32>;

/// One day's cache contents: game id to that game's box score.
pub type DayStats = BTreeMap<String, BoxScoreRecord>;

/// A player's identifier within one source's URL convention.
///
/// Baseball-Reference ids look like `troutmi01`; CBS ids are numeric.
/// Ids are not comparable across sources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The statistic group a fragment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatCategory {
    Batting,
    Pitching,
    Baserunning,
}

/// Descriptive fields attached to every fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Display name as printed in the box score.
    pub name: String,
    /// Full-name slug from the profile link, where the source has one.
    pub full_name: Option<String>,
    pub team: String,
    pub position: Option<String>,
}

/// One category of one player's stats, as extracted from one page region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFragment {
    pub id: PlayerId,
    pub category: StatCategory,
    pub player: PlayerInfo,
    pub stats: StatLine,
}

impl StatFragment {
    pub fn new(id: PlayerId, category: StatCategory, player: PlayerInfo, stats: StatLine) -> Self {
        Self {
            id,
            category,
            player,
            stats,
        }
    }
}

/// Everything a source adapter extracted from one box-score page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFragments {
    pub batting: Vec<StatFragment>,
    pub pitching: Vec<StatFragment>,
    pub baserunning: Vec<StatFragment>,
}

impl GameFragments {
    pub fn is_empty(&self) -> bool {
        self.batting.is_empty() && self.pitching.is_empty() && self.baserunning.is_empty()
    }
}

/// A runner and the number of bases they stole, as read from box-score prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StolenBase {
    pub name: String,
    pub count: u32,
}

impl StolenBase {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// One player's merged statistics for a single game.
///
/// A missing category means the player did not bat, pitch or steal in this
/// game; it is never serialized as an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batting: Option<StatLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitching: Option<StatLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baserunning: Option<StatLine>,
}

impl PlayerGameRecord {
    pub fn category_mut(&mut self, category: StatCategory) -> &mut Option<StatLine> {
        match category {
            StatCategory::Batting => &mut self.batting,
            StatCategory::Pitching => &mut self.pitching,
            StatCategory::Baserunning => &mut self.baserunning,
        }
    }
}

/// All players' records for one game, keyed by player id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxScoreRecord(BTreeMap<PlayerId, PlayerGameRecord>);

impl BoxScoreRecord {
    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&PlayerGameRecord> {
        self.0.get(&PlayerId::new(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerGameRecord)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<PlayerId, PlayerGameRecord>> for BoxScoreRecord {
    fn from(players: BTreeMap<PlayerId, PlayerGameRecord>) -> Self {
        Self(players)
    }
}

/// A box score tagged with the game it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameBoxScore {
    pub game_id: String,
    pub players: BoxScoreRecord,
}
