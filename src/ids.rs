//! Player identifiers derived from each source's profile links.
//!
//! - Baseball-Reference links end in `<id>.shtml`, e.g.
//!   `/players/t/troutmi01.shtml` → `troutmi01`
//! - CBS links end in `<numeric id>/<name slug>/`, e.g.
//!   `/mlb/players/2044511/mike-trout/` → `2044511`

use crate::error::IdentifierError;
use crate::models::PlayerId;

/// Id and name slug from a CBS player link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CbsPlayerLink {
    pub id: PlayerId,
    pub slug: String,
}

/// Baseball-Reference id: the final path segment without its extension.
pub fn bbref_id(href: &str) -> Result<PlayerId, IdentifierError> {
    let last = href.rsplit('/').next().unwrap_or_default();
    let stem = last.split('.').next().unwrap_or_default();
    if stem.is_empty() {
        return Err(IdentifierError::NoSlug(href.to_string()));
    }
    Ok(PlayerId::new(stem))
}

/// CBS id: the numeric segment before the name slug.
pub fn cbs_id(href: &str) -> Result<CbsPlayerLink, IdentifierError> {
    let path = href.trim_end_matches('/');
    let mut segments = path.rsplit('/');
    let slug = segments.next().unwrap_or_default();
    let id = segments
        .next()
        .ok_or_else(|| IdentifierError::TooShort(href.to_string()))?;

    if slug.is_empty() {
        return Err(IdentifierError::NoSlug(href.to_string()));
    }
    if id.is_empty() {
        return Err(IdentifierError::TooShort(href.to_string()));
    }

    let numeric: u64 = id.parse().map_err(|_| IdentifierError::NotNumeric {
        href: href.to_string(),
        segment: id.to_string(),
    })?;

    Ok(CbsPlayerLink {
        id: PlayerId::from(numeric),
        slug: slug.to_string(),
    })
}
