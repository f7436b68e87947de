//! Final assembly of a game's box score.
//!
//! [`build`] is the only place batting defaults are applied: every batting
//! line leaves here with `HR` and `SB` keys, zero when the page had none.

use crate::merge::merge;
use crate::models::{
    BoxScoreRecord, GameBoxScore, GameFragments, PlayerGameRecord, PlayerId, stat,
};
use std::collections::BTreeMap;
use tracing::debug;

const BATTING_DEFAULTS: [&str; 2] = [stat::HOME_RUNS, stat::STOLEN_BASES];

/// Tag merged records with their game and fill batting defaults.
pub fn build(
    game_id: impl Into<String>,
    mut players: BTreeMap<PlayerId, PlayerGameRecord>,
) -> GameBoxScore {
    for record in players.values_mut() {
        if let Some(batting) = record.batting.as_mut() {
            for key in BATTING_DEFAULTS {
                batting.entry(key.to_string()).or_insert(0);
            }
        }
    }

    let game_id = game_id.into();
    debug!(%game_id, players = players.len(), "Built box score");
    GameBoxScore {
        game_id,
        players: BoxScoreRecord::from(players),
    }
}

/// Merge a page's fragments and build its box score.
pub fn from_fragments(game_id: impl Into<String>, fragments: &GameFragments) -> GameBoxScore {
    build(
        game_id,
        merge(
            &fragments.batting,
            &fragments.pitching,
            &fragments.baserunning,
        ),
    )
}
