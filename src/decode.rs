//! Conversions from box-score text to stat counts.
//!
//! Box-score pages encode numbers in several source-specific ways:
//! - blank cells that mean zero
//! - innings pitched as `whole.partial`, where the partial digit is outs
//! - markers such as `W`, `S`, `HR` or `2·SB` inside comma-joined text
//! - stolen-base prose such as `Smith 2, Jones (pickoff)`
//!
//! Every function here is pure. Failures are [`DecodeError`]s and callers
//! skip the row that produced them.

use crate::error::DecodeError;
use crate::models::StolenBase;

/// Parse a stat cell, treating an empty cell as zero.
pub fn number_or_zero(text: &str) -> Result<u32, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| DecodeError::NotANumber(text.to_string()))
}

/// Parse a stat cell that must hold a number.
pub fn integer(text: &str) -> Result<u32, DecodeError> {
    let text = text.trim();
    text.parse()
        .map_err(|_| DecodeError::NotANumber(text.to_string()))
}

/// Convert innings-pitched notation into outs recorded.
///
/// `"6"` is six full innings (18 outs); `"6.2"` is six innings plus two outs
/// (20 outs). The digit after the point is an out count, not a decimal, so
/// only `0`, `1` and `2` are accepted.
pub fn innings_to_outs(text: &str) -> Result<u32, DecodeError> {
    let text = text.trim();
    let (whole, partial) = match text.split_once('.') {
        Some((whole, partial)) => (whole, Some(partial)),
        None => (text, None),
    };

    let whole: u32 = whole
        .parse()
        .map_err(|_| DecodeError::BadInnings(text.to_string()))?;

    let partial = match partial {
        None => 0,
        Some("0") => 0,
        Some("1") => 1,
        Some("2") => 2,
        Some(other) => {
            return Err(DecodeError::BadPartialInning {
                text: text.to_string(),
                partial: other.to_string(),
            });
        }
    };

    Ok(whole * 3 + partial)
}

/// Count a marker token in comma-joined text.
///
/// The text is split on commas and parentheses. A fragment equal to the
/// token counts once; a fragment like `2HR` or `2·SB` counts its leading
/// number. Without a matching fragment the count is zero.
pub fn presence_flag(text: &str, token: &str) -> u32 {
    text.split([',', '(', ')'])
        .find_map(|fragment| fragment_count(fragment.trim(), token))
        .unwrap_or(0)
}

fn fragment_count(fragment: &str, token: &str) -> Option<u32> {
    if fragment == token {
        return Some(1);
    }
    let digits_end = fragment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(fragment.len());
    if digits_end == 0 {
        return None;
    }
    let rest = fragment[digits_end..]
        .trim_start_matches(|c: char| c == '·' || c == 'x' || c.is_whitespace());
    if rest != token {
        return None;
    }
    fragment[..digits_end].parse().ok()
}

/// Parse stolen-base prose into runners and counts.
///
/// ```ignore
/// stolen_base_narrative("Smith 2, Jones (3, 2nd base off Cole/Diaz)")
/// // => [Smith: 2, Jones: 1]
/// ```
pub fn stolen_base_narrative(text: &str) -> Vec<StolenBase> {
    split_outside_parens(text)
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.split('(').next().unwrap_or_default();
            let words: Vec<&str> = entry.split_whitespace().collect();
            let (last, rest) = words.split_last()?;
            match last.parse::<u32>() {
                Ok(count) if last.chars().all(|c| c.is_ascii_digit()) => {
                    if rest.is_empty() {
                        None
                    } else {
                        Some(StolenBase::new(rest.join(" "), count))
                    }
                }
                _ => Some(StolenBase::new(words.join(" "), 1)),
            }
        })
        .collect()
}

/// Split on commas that are not inside parentheses.
fn split_outside_parens(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&text[start..]);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_or_zero() {
        assert_eq!(number_or_zero(""), Ok(0));
        assert_eq!(number_or_zero("7"), Ok(7));
        assert_eq!(number_or_zero(" 12 "), Ok(12));
        assert!(matches!(number_or_zero("x"), Err(DecodeError::NotANumber(_))));
    }

    #[test]
    fn test_integer_rejects_blank() {
        assert_eq!(integer("5"), Ok(5));
        assert!(matches!(integer(""), Err(DecodeError::NotANumber(_))));
    }

    #[test]
    fn test_innings_to_outs_partial_digits() {
        for whole in [0u32, 1, 6, 9, 12] {
            for partial in 0..3u32 {
                let text = format!("{whole}.{partial}");
                assert_eq!(innings_to_outs(&text), Ok(3 * whole + partial), "{text}");
            }
        }
    }

    #[test]
    fn test_innings_to_outs_rejects_bad_partial() {
        for text in ["6.3", "6.5", "1.9", "2.12"] {
            assert!(
                matches!(innings_to_outs(text), Err(DecodeError::BadPartialInning { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn test_innings_to_outs_whole_innings() {
        assert_eq!(innings_to_outs("7"), Ok(21));
        assert!(matches!(innings_to_outs("x.1"), Err(DecodeError::BadInnings(_))));
        assert!(matches!(innings_to_outs(""), Err(DecodeError::BadInnings(_))));
    }

    #[test]
    fn test_presence_flag_stat_line() {
        assert_eq!(presence_flag("2B, HR", "HR"), 1);
        assert_eq!(presence_flag("2B, HR", "SB"), 0);
        assert_eq!(presence_flag("2·HR,SB", "HR"), 2);
        assert_eq!(presence_flag("2·HR,SB", "SB"), 1);
        assert_eq!(presence_flag("3SB", "SB"), 3);
        assert_eq!(presence_flag("", "HR"), 0);
    }

    #[test]
    fn test_presence_flag_ignores_lookalikes() {
        assert_eq!(presence_flag("2B,3B", "HR"), 0);
        assert_eq!(presence_flag("Emmanuel Clase, BS (2)", "S"), 0);
        assert_eq!(presence_flag("CS", "SB"), 0);
    }

    #[test]
    fn test_presence_flag_pitcher_markers() {
        assert_eq!(presence_flag("W", "W"), 1);
        assert_eq!(presence_flag("Gerrit Cole, W (3-0)", "W"), 1);
        assert_eq!(presence_flag("Gerrit Cole, W (3-0)", "S"), 0);
        assert_eq!(presence_flag("L. Webb (W, 10-8)", "W"), 1);
        assert_eq!(presence_flag("C. Doval (S, 29)", "S"), 1);
        assert_eq!(presence_flag("C. Doval (S, 29)", "W"), 0);
    }

    #[test]
    fn test_stolen_base_narrative() {
        assert_eq!(
            stolen_base_narrative("Smith 2, Jones"),
            vec![StolenBase::new("Smith", 2), StolenBase::new("Jones", 1)]
        );
    }

    #[test]
    fn test_stolen_base_narrative_strips_parenthetical() {
        assert_eq!(
            stolen_base_narrative(
                "J. Rojas (pickoff), M. Betts 2 (14, 2nd base off Webb/Bailey), F. Freeman"
            ),
            vec![
                StolenBase::new("J. Rojas", 1),
                StolenBase::new("M. Betts", 2),
                StolenBase::new("F. Freeman", 1),
            ]
        );
    }

    #[test]
    fn test_stolen_base_narrative_skips_empty_entries() {
        assert!(stolen_base_narrative("").is_empty());
        assert_eq!(
            stolen_base_narrative(" ,  Smith ,"),
            vec![StolenBase::new("Smith", 1)]
        );
    }
}
