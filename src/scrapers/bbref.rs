//! Baseball-Reference box-score adapter.
//!
//! Baseball-Reference ships its stat tables inside HTML comments, which are
//! uncommented client-side. Each comment holding a `<table` is parsed as its
//! own fragment; in page order, fragment 1 is the visitor batting table,
//! fragment 2 the home batting table and fragment 3 holds both pitching
//! tables (one `tbody` per team, visitor first).
//!
//! Cells are keyed by their `data-stat` attribute. Player links look like
//! `/players/t/troutmi01.shtml`.

use crate::decode::{innings_to_outs, integer, number_or_zero, presence_flag};
use crate::error::{DecodeError, RowError, StructuralError};
use crate::ids::bbref_id;
use crate::models::{GameFragments, PlayerInfo, StatCategory, StatFragment, StatLine, stat};
use crate::scrapers::tables::{element_text, first_link};
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

const BASE_URL: &str = "https://www.baseball-reference.com";
const BOX_LINK_PREFIX: &str = "/boxes/";
const BOX_LINK_SUFFIX: &str = ".shtml";

const BATTING_TABLES: [usize; 2] = [1, 2];
const PITCHING_TABLE: usize = 3;
const MIN_COMMENT_TABLES: usize = 4;

/// `<title>` reads `"<Visitor> vs <Home> Box Score: <date> | ..."`.
const TITLE_TERMINATOR: &str = "Box Score:";
const TEAM_SEPARATOR: &str = " vs ";

static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static HEADER_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th").unwrap());
static DATA_CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").unwrap());

/// Scoreboard page listing a day's games.
///
/// Month and day are zero-padded:
/// `https://www.baseball-reference.com/boxes/?year=2023&month=04&day=26`.
pub fn scoreboard_url(day: NaiveDate) -> String {
    format!(
        "{}/boxes/?year={}&month={}&day={}",
        BASE_URL,
        day.format("%Y"),
        day.format("%m"),
        day.format("%d")
    )
}

/// Box-score URLs linked from a day's scoreboard page.
pub fn parse_scoreboard(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(BOX_LINK_PREFIX) && href.ends_with(BOX_LINK_SUFFIX))
        .filter_map(|href| BASE.join(href).ok())
        .map(String::from)
        .unique()
        .collect()
}

/// Game id: the page's file stem, e.g. `PIT202304260`.
pub fn game_id(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or_default();
    last.split('.').next().unwrap_or_default().to_string()
}

/// Visitor and home team names from the page title.
pub fn teams_from_title(title: &str) -> Result<Vec<String>, StructuralError> {
    let (matchup, _) = title
        .split_once(TITLE_TERMINATOR)
        .ok_or_else(|| StructuralError::NoTeams(title.to_string()))?;
    let teams: Vec<String> = matchup
        .split(TEAM_SEPARATOR)
        .map(|team| team.trim().to_string())
        .collect();
    if teams.len() != 2 || teams.iter().any(String::is_empty) {
        return Err(StructuralError::NoTeams(title.to_string()));
    }
    Ok(teams)
}

/// Parse every commented-out table in page order.
fn comment_tables(document: &Html) -> Vec<Html> {
    document
        .tree
        .nodes()
        .filter_map(|node| node.value().as_comment())
        .filter(|comment| comment.contains("<table"))
        .map(|comment| Html::parse_fragment(comment))
        .collect()
}

/// Extract batting and pitching fragments from a box-score page.
///
/// Returns empty fragments when the title does not name two teams or the
/// page has too few commented tables.
pub fn extract(html: &str) -> GameFragments {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let teams = match teams_from_title(&title) {
        Ok(teams) => teams,
        Err(e) => {
            warn!(error = %e, "No extractable data");
            return GameFragments::default();
        }
    };

    let tables = comment_tables(&document);
    if tables.len() < MIN_COMMENT_TABLES {
        let e = StructuralError::TooFewTables {
            found: tables.len(),
            expected: MIN_COMMENT_TABLES,
        };
        info!(error = %e, "No extractable data");
        return GameFragments::default();
    }

    let mut fragments = GameFragments::default();
    for (side, index) in BATTING_TABLES.into_iter().enumerate() {
        let Some(tbody) = tables[index].select(&TBODY).next() else {
            debug!(index, "Batting table has no body");
            continue;
        };
        let rows = tbody
            .select(&ROW)
            .filter(|row| row.value().attr("class").is_none());
        fragments
            .batting
            .extend(collect_rows(rows, &teams[side], batting_fragment));
    }

    for (side, tbody) in tables[PITCHING_TABLE].select(&TBODY).enumerate() {
        let Some(team) = teams.get(side) else {
            debug!(side, "Extra pitching table body; ignoring");
            break;
        };
        fragments
            .pitching
            .extend(collect_rows(tbody.select(&ROW), team, pitching_fragment));
    }

    info!(
        visitor = %teams[0],
        home = %teams[1],
        batting = fragments.batting.len(),
        pitching = fragments.pitching.len(),
        "Extracted Baseball-Reference box score"
    );
    fragments
}

fn collect_rows<'a, I, F>(rows: I, team: &str, parse: F) -> Vec<StatFragment>
where
    I: Iterator<Item = ElementRef<'a>>,
    F: Fn(ElementRef<'a>, &str) -> Option<Result<StatFragment, RowError>>,
{
    rows.filter_map(|row| match parse(row, team)? {
        Ok(fragment) => Some(fragment),
        Err(e) => {
            warn!(row = %element_text(row), error = %e, "Skipping row");
            None
        }
    })
    .collect()
}

/// Cells of a row keyed by `data-stat`.
fn stat_cells(row: ElementRef<'_>) -> Vec<(String, String)> {
    row.select(&DATA_CELL)
        .filter_map(|td| {
            let key = td.value().attr("data-stat")?;
            Some((key.to_string(), element_text(td)))
        })
        .collect()
}

fn cell<'c>(cells: &'c [(String, String)], key: &str) -> Result<&'c str, DecodeError> {
    cells
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| DecodeError::MissingColumn(key.to_string()))
}

/// `None` when the row has no player link.
fn batting_fragment(row: ElementRef<'_>, team: &str) -> Option<Result<StatFragment, RowError>> {
    let header = row.select(&HEADER_CELL).next()?;
    let link = first_link(header)?;
    Some(batting_line(row, header, &link.href, &link.text, team))
}

fn batting_line(
    row: ElementRef<'_>,
    header: ElementRef<'_>,
    href: &str,
    name: &str,
    team: &str,
) -> Result<StatFragment, RowError> {
    let id = bbref_id(href)?;
    let position = element_text(header)
        .split(' ')
        .next_back()
        .map(str::to_string);

    let cells = stat_cells(row);
    let mut stats = StatLine::new();
    for key in [stat::AT_BATS, stat::HITS, stat::RUNS, stat::RBI] {
        stats.insert(key.to_string(), number_or_zero(cell(&cells, key)?)?);
    }

    let details = row
        .select(&DATA_CELL)
        .last()
        .map(element_text)
        .unwrap_or_default();
    stats.insert(stat::HOME_RUNS.to_string(), presence_flag(&details, stat::HOME_RUNS));
    stats.insert(stat::STOLEN_BASES.to_string(), presence_flag(&details, stat::STOLEN_BASES));

    Ok(StatFragment::new(
        id,
        StatCategory::Batting,
        PlayerInfo {
            name: name.to_string(),
            full_name: None,
            team: team.to_string(),
            position,
        },
        stats,
    ))
}

/// `None` when the row has no player link.
fn pitching_fragment(row: ElementRef<'_>, team: &str) -> Option<Result<StatFragment, RowError>> {
    let header = row.select(&HEADER_CELL).next()?;
    let link = first_link(header)?;
    Some(pitching_line(row, header, &link.href, &link.text, team))
}

fn pitching_line(
    row: ElementRef<'_>,
    header: ElementRef<'_>,
    href: &str,
    name: &str,
    team: &str,
) -> Result<StatFragment, RowError> {
    let id = bbref_id(href)?;
    let decision = element_text(header);
    let cells = stat_cells(row);

    let mut stats = StatLine::new();
    stats.insert(stat::WIN.to_string(), presence_flag(&decision, "W"));
    stats.insert(stat::SAVE.to_string(), presence_flag(&decision, "S"));
    stats.insert(stat::OUTS.to_string(), innings_to_outs(cell(&cells, "IP")?)?);
    for key in [stat::HITS, stat::EARNED_RUNS, stat::WALKS, stat::STRIKEOUTS] {
        stats.insert(key.to_string(), integer(cell(&cells, key)?)?);
    }

    Ok(StatFragment::new(
        id,
        StatCategory::Pitching,
        PlayerInfo {
            name: name.to_string(),
            full_name: None,
            team: team.to_string(),
            position: None,
        },
        stats,
    ))
}
