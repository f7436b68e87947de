//! CBS Sports box-score adapter.
//!
//! CBS renders a game's box score as plain tables. Pages that carry stats
//! have at least eight tables; the odd-numbered ones are the visitor and
//! home batting grids followed by the visitor and home pitching grids.
//!
//! # URL Pattern
//!
//! Box scores live at `/mlb/gametracker/boxscore/MLB_<date>_<AWAY>@<HOME>[_n]/`;
//! the team codes are read from that last segment. Player links look like
//! `/mlb/players/<id>/<name-slug>/`.
//!
//! Stolen bases are only given as prose after an `SB` label, which is
//! decoded and attributed with [`crate::merge::attribute_steals`].

use crate::decode::{innings_to_outs, integer, number_or_zero, presence_flag, stolen_base_narrative};
use crate::error::{RowError, StructuralError};
use crate::ids::cbs_id;
use crate::merge::attribute_steals;
use crate::models::{
    GameFragments, PlayerInfo, StatCategory, StatFragment, StatLine, StolenBase, stat,
};
use crate::scrapers::tables::{self, Grid, RowLink};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

const BASE_URL: &str = "https://cbssports.com";
const SCOREBOARD_URL: &str = "https://www.cbssports.com/mlb/scoreboard";
const BOX_LINK_PREFIX: &str = "/mlb/gametracker/boxscore/";

/// Scoreboard entries that mark the All-Star exhibition.
const ALL_STAR_MARKERS: &[&str] = &["NLA"];

const MIN_TABLES: usize = 8;
const BATTING_TABLES: [usize; 2] = [1, 3];
const PITCHING_TABLES: [usize; 2] = [5, 7];

const HITTERS_COLUMN: &str = "HITTERS";
const PITCHERS_COLUMN: &str = "PITCHERS";
const INNINGS_COLUMN: &str = "IP";

/// Text-node boundary around the stolen-base label, as seen once the
/// page's text nodes are joined with `|`.
const SB_LABEL: &str = "|SB| - ";

static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Scoreboard page listing a day's games, e.g.
/// `https://www.cbssports.com/mlb/scoreboard/20230718/`.
pub fn scoreboard_url(day: NaiveDate) -> String {
    format!("{}/{}/", SCOREBOARD_URL, day.format("%Y%m%d"))
}

/// Box-score URLs linked from a scoreboard page.
///
/// A day whose only game is the All-Star exhibition yields no URLs.
pub fn parse_scoreboard(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let urls: Vec<String> = document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with(BOX_LINK_PREFIX))
        .filter_map(|href| BASE.join(href).ok())
        .map(String::from)
        .unique()
        .collect();

    if let [only] = urls.as_slice() {
        if ALL_STAR_MARKERS.iter().any(|marker| only.contains(marker)) {
            info!(url = %only, "Only game of the day is the All-Star game; skipping");
            return Vec::new();
        }
    }
    urls
}

/// Game id: the last non-empty path segment.
pub fn game_id(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Visitor and home team codes from a box-score URL.
pub fn teams_from_url(url: &str) -> Result<Vec<String>, StructuralError> {
    let segment = game_id(url);
    let matchup = segment
        .split('_')
        .rev()
        .find(|part| part.contains('@'))
        .ok_or_else(|| StructuralError::NoTeams(url.to_string()))?;

    let teams: Vec<String> = matchup.split('@').map(str::to_string).collect();
    if teams.len() != 2 || teams.iter().any(String::is_empty) {
        return Err(StructuralError::NoTeams(url.to_string()));
    }
    Ok(teams)
}

/// Extract batting, pitching and baserunning fragments from a box-score page.
///
/// Returns empty fragments when the page lacks the expected tables or the
/// teams cannot be read from the URL.
pub fn extract(url: &str, html: &str) -> GameFragments {
    let teams = match teams_from_url(url) {
        Ok(teams) => teams,
        Err(e) => {
            warn!(%url, error = %e, "No extractable data");
            return GameFragments::default();
        }
    };

    let document = Html::parse_document(html);
    let grids = tables::read_grids(&document);
    let table_elements = tables::tables(&document);
    if table_elements.len() < MIN_TABLES {
        let e = StructuralError::TooFewTables {
            found: table_elements.len(),
            expected: MIN_TABLES,
        };
        info!(%url, error = %e, "No extractable data");
        return GameFragments::default();
    }

    let mut fragments = GameFragments::default();
    for (side, index) in BATTING_TABLES.into_iter().enumerate() {
        let links = tables::row_links(table_elements[index]);
        fragments.batting.extend(rows(&grids[index], &links, &teams[side], batting_fragment));
    }
    for (side, index) in PITCHING_TABLES.into_iter().enumerate() {
        let links = tables::row_links(table_elements[index]);
        fragments.pitching.extend(rows(&grids[index], &links, &teams[side], pitching_fragment));
    }

    let sections = stolen_base_sections(&document);
    fragments.baserunning = attribute_steals(&fragments.batting, &sections, &teams);

    info!(
        %url,
        batting = fragments.batting.len(),
        pitching = fragments.pitching.len(),
        baserunning = fragments.baserunning.len(),
        "Extracted CBS box score"
    );
    fragments
}

fn rows<F>(grid: &Grid, links: &[Option<RowLink>], team: &str, parse: F) -> Vec<StatFragment>
where
    F: Fn(&Grid, usize, &RowLink, &str) -> Result<StatFragment, RowError>,
{
    links
        .iter()
        .enumerate()
        .filter_map(|(row, link)| {
            let link = link.as_ref()?;
            match parse(grid, row, link, team) {
                Ok(fragment) => Some(fragment),
                Err(e) => {
                    warn!(row, player = %link.text, href = %link.href, error = %e, "Skipping row");
                    None
                }
            }
        })
        .collect()
}

fn batting_fragment(
    grid: &Grid,
    row: usize,
    link: &RowLink,
    team: &str,
) -> Result<StatFragment, RowError> {
    let player = cbs_id(&link.href)?;
    let position = grid
        .cell(row, HITTERS_COLUMN)?
        .split(' ')
        .next_back()
        .map(str::to_string);

    let mut stats = StatLine::new();
    for key in [stat::AT_BATS, stat::RUNS, stat::HITS, stat::RBI, stat::HOME_RUNS] {
        stats.insert(key.to_string(), number_or_zero(grid.cell(row, key)?)?);
    }

    Ok(StatFragment::new(
        player.id,
        StatCategory::Batting,
        PlayerInfo {
            name: link.text.clone(),
            full_name: Some(player.slug),
            team: team.to_string(),
            position,
        },
        stats,
    ))
}

fn pitching_fragment(
    grid: &Grid,
    row: usize,
    link: &RowLink,
    team: &str,
) -> Result<StatFragment, RowError> {
    let player = cbs_id(&link.href)?;
    let pitcher = grid.cell(row, PITCHERS_COLUMN)?;

    let mut stats = StatLine::new();
    stats.insert(stat::WIN.to_string(), presence_flag(pitcher, "W"));
    stats.insert(stat::SAVE.to_string(), presence_flag(pitcher, "S"));
    stats.insert(stat::OUTS.to_string(), innings_to_outs(grid.cell(row, INNINGS_COLUMN)?)?);
    for key in [stat::HITS, stat::WALKS, stat::EARNED_RUNS, stat::STRIKEOUTS] {
        stats.insert(key.to_string(), integer(grid.cell(row, key)?)?);
    }
    let walks_plus_hits = stats[stat::HITS] + stats[stat::WALKS];
    stats.insert(stat::WALKS_PLUS_HITS.to_string(), walks_plus_hits);

    Ok(StatFragment::new(
        player.id,
        StatCategory::Pitching,
        PlayerInfo {
            name: link.text.clone(),
            full_name: Some(player.slug),
            team: team.to_string(),
            position: None,
        },
        stats,
    ))
}

/// Runner lists from each `SB - ...` block, visitor first.
///
/// The page repeats a lone team's block, so two blocks mean one team; more
/// blocks are the two teams followed by repeats.
pub fn stolen_base_sections(document: &Html) -> Vec<Vec<StolenBase>> {
    let text = document.root_element().text().collect::<Vec<_>>().join("|");
    let blocks: Vec<&str> = text.split(SB_LABEL).skip(1).collect();
    let blocks = match blocks.len() {
        2 => &blocks[..1],
        n => &blocks[..n.min(2)],
    };

    blocks
        .iter()
        .map(|block| {
            let prose = block.split('|').next().unwrap_or_default();
            debug!(prose = %truncate_for_log(prose, 120), "Stolen-base prose");
            stolen_base_narrative(prose)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://cbssports.com/mlb/gametracker/boxscore/MLB_20230718_SF@CIN_2/";

    fn batting_table(rows: &[(&str, &str, &str, &str)]) -> String {
        let mut html = String::from(
            "<table><tr><th>HITTERS</th><th>AB</th><th>R</th><th>H</th><th>RBI</th><th>HR</th><th>BB</th></tr>",
        );
        for (id, name, position, line) in rows {
            let slug = name.to_lowercase().replace(". ", "-");
            html.push_str(&format!(
                "<tr><td><a href=\"/mlb/players/{id}/{slug}/\">{name}</a> {position}</td>{line}</tr>"
            ));
        }
        html.push_str(
            "<tr><td>Totals</td><td>35</td><td>5</td><td>9</td><td>5</td><td>1</td><td>3</td></tr></table>",
        );
        html
    }

    fn pitching_table(rows: &[(&str, &str, &str, &str)]) -> String {
        let mut html = String::from(
            "<table><tr><th>PITCHERS</th><th>IP</th><th>H</th><th>R</th><th>ER</th><th>BB</th><th>SO</th></tr>",
        );
        for (id, name, decision, line) in rows {
            html.push_str(&format!(
                "<tr><td><a href=\"/mlb/players/{id}/x/\">{name}</a>{decision}</td>{line}</tr>"
            ));
        }
        html.push_str("</table>");
        html
    }

    fn page(sb: &str) -> String {
        let filler = "<table><tr><th>-</th></tr></table>";
        format!(
            "<html><head><title>box</title></head><body>{filler}{}{filler}{}{filler}{}{filler}{}<div>{sb}</div></body></html>",
            batting_table(&[
                (
                    "101",
                    "L. Wade",
                    "1B",
                    "<td>4</td><td>1</td><td>2</td><td>1</td><td>1</td><td>0</td>",
                ),
                (
                    "102",
                    "J. Smith",
                    "LF",
                    "<td>3</td><td>0</td><td>0</td><td>0</td><td>0</td><td>1</td>",
                ),
            ]),
            batting_table(&[
                (
                    "201",
                    "E. De La Cruz",
                    "SS",
                    "<td>4</td><td>2</td><td>3</td><td>0</td><td>0</td><td>0</td>",
                ),
                (
                    "202",
                    "J. Smith",
                    "C",
                    "<td>4</td><td>0</td><td>1</td><td>0</td><td></td><td>0</td>",
                ),
            ]),
            pitching_table(&[(
                "103",
                "L. Webb",
                " (W, 10-8)",
                "<td>6.2</td><td>5</td><td>2</td><td>2</td><td>1</td><td>7</td>",
            )]),
            pitching_table(&[
                (
                    "203",
                    "H. Greene",
                    " (L, 2-5)",
                    "<td>5</td><td>6</td><td>4</td><td>4</td><td>3</td><td>6</td>",
                ),
                (
                    "204",
                    "A. Diaz",
                    "",
                    "<td>1.1</td><td>0</td><td>0</td><td>0</td><td>0</td><td>2</td>",
                ),
            ]),
        )
    }

    #[test]
    fn test_extract_batting_and_pitching() {
        let fragments = extract(URL, &page(""));
        assert_eq!(fragments.batting.len(), 4);
        assert_eq!(fragments.pitching.len(), 3);
        assert!(fragments.baserunning.is_empty());

        let wade = &fragments.batting[0];
        assert_eq!(wade.id.as_str(), "101");
        assert_eq!(wade.player.name, "L. Wade");
        assert_eq!(wade.player.full_name.as_deref(), Some("l-wade"));
        assert_eq!(wade.player.team, "SF");
        assert_eq!(wade.player.position.as_deref(), Some("1B"));
        assert_eq!(wade.stats["HR"], 1);
        assert_eq!(wade.stats["H"], 2);
        assert!(!wade.stats.contains_key("SB"));

        let home_smith = &fragments.batting[3];
        assert_eq!(home_smith.player.team, "CIN");
        assert_eq!(home_smith.stats["HR"], 0);

        let webb = &fragments.pitching[0];
        assert_eq!(webb.stats["Win"], 1);
        assert_eq!(webb.stats["Save"], 0);
        assert_eq!(webb.stats["Outs"], 20);
        assert_eq!(webb.stats["WH"], 6);
        assert_eq!(webb.stats["SO"], 7);

        let diaz = &fragments.pitching[2];
        assert_eq!(diaz.player.team, "CIN");
        assert_eq!(diaz.stats["Outs"], 4);
        assert_eq!(diaz.stats["Win"], 0);
    }

    #[test]
    fn test_extract_stolen_bases_single_section() {
        let fragments = extract(
            URL,
            &page("<b>SB</b> - E. De La Cruz 2 (14, 2nd base off Webb/Bailey), J. Smith"),
        );
        let steals: Vec<(&str, u32)> = fragments
            .baserunning
            .iter()
            .map(|f| (f.id.as_str(), f.stats["SB"]))
            .collect();
        assert_eq!(steals, vec![("201", 2), ("202", 1)]);
    }

    #[test]
    fn test_extract_ambiguous_runner_dropped() {
        let fragments = extract(URL, &page("<b>SB</b> - J. Smith"));
        assert!(fragments.baserunning.is_empty());
    }

    #[test]
    fn test_row_with_bad_player_link_is_skipped() {
        let html = page("").replace("/mlb/players/102/", "/mlb/players/abc/");
        let fragments = extract(URL, &html);

        let ids: Vec<&str> = fragments.batting.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "201", "202"]);
        assert_eq!(fragments.pitching.len(), 3);
    }

    #[test]
    fn test_too_few_tables_is_empty() {
        let html = "<html><body><table><tr><td>1</td></tr></table></body></html>";
        let fragments = extract(URL, html);
        assert!(fragments.batting.is_empty());
        assert!(fragments.pitching.is_empty());
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_url_without_matchup_is_empty() {
        let fragments = extract("https://cbssports.com/mlb/gametracker/boxscore/", &page(""));
        assert!(fragments.is_empty());
    }

    #[test]
    fn test_teams_from_url() {
        assert_eq!(teams_from_url(URL).unwrap(), vec!["SF", "CIN"]);
        assert_eq!(
            teams_from_url("https://cbssports.com/mlb/gametracker/boxscore/MLB_20230401_NYY@BOS")
                .unwrap(),
            vec!["NYY", "BOS"]
        );
        assert!(teams_from_url("https://cbssports.com/mlb/").is_err());
    }

    #[test]
    fn test_game_id() {
        assert_eq!(game_id(URL), "MLB_20230718_SF@CIN_2");
    }

    #[test]
    fn test_stolen_base_sections_repeat_rule() {
        let one =
            Html::parse_document("<p>Notes</p><p><b>SB</b> - A. One</p><p><b>SB</b> - A. One</p>");
        assert_eq!(stolen_base_sections(&one).len(), 1);

        let two = Html::parse_document(
            "<p>Notes</p><p><b>SB</b> - A. One</p><p><b>SB</b> - B. Two 2</p><p><b>SB</b> - A. One</p><p><b>SB</b> - B. Two 2</p>",
        );
        let sections = stolen_base_sections(&two);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1], vec![StolenBase::new("B. Two", 2)]);

        let none = Html::parse_document("<p>No steals</p>");
        assert!(stolen_base_sections(&none).is_empty());
    }

    #[test]
    fn test_parse_scoreboard() {
        let html = r#"<html><body>
            <a href="/mlb/gametracker/boxscore/MLB_20230718_SF@CIN/">Box</a>
            <a href="/mlb/gametracker/boxscore/MLB_20230718_SF@CIN/">Box again</a>
            <a href="/mlb/gametracker/boxscore/MLB_20230718_NYY@LAA/">Box</a>
            <a href="/mlb/gametracker/recap/MLB_20230718_NYY@LAA/">Recap</a>
        </body></html>"#;
        assert_eq!(
            parse_scoreboard(html),
            vec![
                "https://cbssports.com/mlb/gametracker/boxscore/MLB_20230718_SF@CIN/",
                "https://cbssports.com/mlb/gametracker/boxscore/MLB_20230718_NYY@LAA/",
            ]
        );
    }

    #[test]
    fn test_parse_scoreboard_all_star_day_is_empty() {
        let html = r#"<a href="/mlb/gametracker/boxscore/MLB_20230711_AL@NLA/">Box</a>"#;
        assert!(parse_scoreboard(html).is_empty());
    }

    #[test]
    fn test_scoreboard_url() {
        let day = NaiveDate::from_ymd_opt(2023, 7, 18).unwrap();
        assert_eq!(scoreboard_url(day), "https://www.cbssports.com/mlb/scoreboard/20230718/");
    }
}
