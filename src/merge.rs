//! Merging per-category fragments into one record per player.
//!
//! Batting, pitching and baserunning stats come from different regions of a
//! box-score page. [`merge`] unions them by player id. [`attribute_steals`]
//! turns stolen-base prose, which names runners but not their teams, into
//! baserunning fragments keyed by id.

use crate::models::{
    PlayerGameRecord, PlayerId, PlayerInfo, StatCategory, StatFragment, StatLine, StolenBase,
    stat,
};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Union fragments by player id.
///
/// Every id found in any list gets a record. A category is present only if
/// the player has a fragment in it. Repeated fragments for the same player
/// and category overwrite earlier values key by key. Descriptive fields come
/// from the first fragment that supplies them, in batting, pitching,
/// baserunning order.
///
/// No defaults are filled in here; see [`crate::boxscore::build`].
pub fn merge(
    batting: &[StatFragment],
    pitching: &[StatFragment],
    baserunning: &[StatFragment],
) -> BTreeMap<PlayerId, PlayerGameRecord> {
    let mut players: BTreeMap<PlayerId, PlayerGameRecord> = BTreeMap::new();

    for fragment in batting.iter().chain(pitching).chain(baserunning) {
        let record = players
            .entry(fragment.id.clone())
            .or_insert_with(|| PlayerGameRecord {
                name: fragment.player.name.clone(),
                team: fragment.player.team.clone(),
                ..PlayerGameRecord::default()
            });
        fill_descriptive(record, &fragment.player);
        record
            .category_mut(fragment.category)
            .get_or_insert_with(StatLine::new)
            .extend(fragment.stats.iter().map(|(k, v)| (k.clone(), *v)));
    }

    debug!(players = players.len(), "Merged fragments");
    players
}

fn fill_descriptive(record: &mut PlayerGameRecord, player: &PlayerInfo) {
    if record.name.is_empty() {
        record.name = player.name.clone();
    }
    if record.team.is_empty() {
        record.team = player.team.clone();
    }
    if record.full_name.is_none() {
        record.full_name = player.full_name.clone();
    }
    if record.position.is_none() {
        record.position = player.position.clone();
    }
}

/// Attribute stolen-base prose to batters.
///
/// `sections` holds one runner list per stolen-base block on the page, in
/// page order; `teams` lists the game's teams, visitor first.
///
/// A runner whose display name matches batters on exactly one team is
/// attributed to that batter. A name shared across teams is resolved only
/// through its section's team; otherwise it is dropped. A section's team is
/// the one its unambiguous runners agree on. In a two-team game, a section
/// whose team cannot be read from its own runners takes the team no other
/// section has claimed. This is an approximation: it assumes each section
/// belongs to a different team. With two unresolved sections the page's
/// visitor/home order decides.
pub fn attribute_steals(
    batting: &[StatFragment],
    sections: &[Vec<StolenBase>],
    teams: &[String],
) -> Vec<StatFragment> {
    let section_teams = section_teams(batting, sections, teams);

    let mut fragments = Vec::new();
    for (runners, section_team) in sections.iter().zip(&section_teams) {
        for runner in runners {
            match resolve_runner(batting, runner, section_team.as_deref()) {
                Some(batter) => {
                    debug!(
                        runner = %runner.name,
                        id = batter.id.as_str(),
                        count = runner.count,
                        "Attributed stolen base"
                    );
                    fragments.push(StatFragment::new(
                        batter.id.clone(),
                        StatCategory::Baserunning,
                        batter.player.clone(),
                        StatLine::from([(stat::STOLEN_BASES.to_string(), runner.count)]),
                    ))
                }
                None => warn!(
                    runner = %runner.name,
                    count = runner.count,
                    "Could not attribute stolen base; dropping"
                ),
            }
        }
    }
    fragments
}

fn batters_named<'a>(batting: &'a [StatFragment], name: &str) -> Vec<&'a StatFragment> {
    batting
        .iter()
        .filter(|f| f.player.name == name)
        .unique_by(|f| f.id.clone())
        .collect()
}

/// The single team a runner's name points to, if unambiguous.
fn runner_team<'a>(batting: &'a [StatFragment], name: &str) -> Option<&'a str> {
    batters_named(batting, name)
        .into_iter()
        .map(|f| f.player.team.as_str())
        .unique()
        .exactly_one()
        .ok()
}

fn section_teams(
    batting: &[StatFragment],
    sections: &[Vec<StolenBase>],
    teams: &[String],
) -> Vec<Option<String>> {
    let mut inferred: Vec<Option<String>> = sections
        .iter()
        .map(|runners| {
            runners
                .iter()
                .filter_map(|runner| runner_team(batting, &runner.name))
                .unique()
                .exactly_one()
                .ok()
                .map(str::to_string)
        })
        .collect();

    let distinct_teams: Vec<&String> = teams.iter().unique().collect();
    if distinct_teams.len() != 2 {
        return inferred;
    }

    for i in 0..inferred.len() {
        if inferred[i].is_some() {
            continue;
        }
        let unclaimed = {
            let claimed: Vec<&String> = inferred
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, team)| team.as_ref())
                .unique()
                .collect();
            match claimed.as_slice() {
                [claimed] => distinct_teams
                    .iter()
                    .find(|team| **team != *claimed)
                    .map(|team| team.to_string()),
                _ => None,
            }
        };
        inferred[i] = unclaimed;
    }

    if inferred.len() == 2 && inferred.iter().all(Option::is_none) {
        debug!("Falling back to visitor/home order for stolen-base sections");
        inferred = distinct_teams.iter().map(|t| Some(t.to_string())).collect();
    }

    inferred
}

fn resolve_runner<'a>(
    batting: &'a [StatFragment],
    runner: &StolenBase,
    section_team: Option<&str>,
) -> Option<&'a StatFragment> {
    let candidates = batters_named(batting, &runner.name);
    match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        _ => {
            let team = section_team?;
            candidates
                .into_iter()
                .filter(|f| f.player.team == team)
                .exactly_one()
                .ok()
        }
    }
}
