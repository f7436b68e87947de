//! Reading HTML tables as text grids.
//!
//! [`read_grids`] turns every `<table>` in a document into a [`Grid`] of
//! cell text: the first row becomes the header, the rest are data rows.
//! [`row_links`] walks the same rows and returns each data row's first
//! link, so a grid row and its player link share an index.

use crate::error::DecodeError;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").unwrap());
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// A table's cell text, header row separated from data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Text of the named column in data row `row`.
    pub fn cell(&self, row: usize, name: &str) -> Result<&str, DecodeError> {
        let col = self
            .column(name)
            .ok_or_else(|| DecodeError::MissingColumn(name.to_string()))?;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .ok_or_else(|| DecodeError::MissingColumn(name.to_string()))
    }
}

/// A player link found in a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLink {
    pub href: String,
    pub text: String,
}

/// All tables in the document, in document order.
pub fn tables(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&TABLE).collect()
}

/// Every table in the document as a grid, in document order.
pub fn read_grids(document: &Html) -> Vec<Grid> {
    tables(document).into_iter().map(read_grid).collect()
}

fn read_grid(table: ElementRef<'_>) -> Grid {
    let mut rows = table.select(&ROW).map(|row| {
        row.select(&CELL)
            .map(element_text)
            .collect::<Vec<String>>()
    });
    let headers = rows.next().unwrap_or_default();
    Grid {
        headers,
        rows: rows.collect(),
    }
}

/// The first link of each data row (rows after the header), if any.
pub fn row_links(table: ElementRef<'_>) -> Vec<Option<RowLink>> {
    table
        .select(&ROW)
        .skip(1)
        .map(first_link)
        .collect()
}

/// First `a[href]` inside `element`, with its collapsed text.
pub fn first_link(element: ElementRef<'_>) -> Option<RowLink> {
    let link = element.select(&LINK).next()?;
    let href = link.value().attr("href")?;
    Some(RowLink {
        href: href.to_string(),
        text: element_text(link),
    })
}

/// An element's text with whitespace runs collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
