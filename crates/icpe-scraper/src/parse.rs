//! Extraction of the rubrique table from a Géorisques facility page.
//!
//! The page lists the facility's regulated activities in the first table that
//! follows the "Situation administrative" heading:
//!
//! | Rubri. IC | Ali. | Date auto. | Etat d'activité | Régime autorisé(3) | Activité | Volume | Unité |
//! |-----------|------|------------|-----------------|--------------------|----------|--------|-------|
//!
//! Header labels are trimmed and matched with their footnote marker removed.
//! Cell values are kept verbatim.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use icpe_core::RegulatoryEntry;

use crate::error::ParseError;

pub const SITUATION_HEADING: &str = "Situation administrative";

const CODE_LABEL: &str = "Rubri. IC";

static HEADING_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid heading selector"));
static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(\d+\)$").expect("valid footnote regex"));

/// Returns the first `<table>` after the heading whose trimmed text is
/// `heading_text`, in document order.
///
/// Returns `None` when no such heading exists, or when it is not followed by
/// a table.
#[must_use]
pub fn locate_table<'a>(document: &'a Html, heading_text: &str) -> Option<ElementRef<'a>> {
    let heading = find_heading(document, heading_text)?;
    table_after(document, heading)
}

/// Parses `raw_html` and returns the entries of its rubrique table.
///
/// # Errors
///
/// - [`ParseError::HeadingNotFound`] if the "Situation administrative" heading is absent.
/// - [`ParseError::TableNotFound`] if no table follows the heading.
/// - [`ParseError::MissingColumn`] if the table has no "Rubri. IC" column.
pub fn parse_entries(raw_html: &str) -> Result<Vec<RegulatoryEntry>, ParseError> {
    let document = Html::parse_document(raw_html);
    entries_from_document(&document)
}

pub(crate) fn entries_from_document(document: &Html) -> Result<Vec<RegulatoryEntry>, ParseError> {
    let heading = find_heading(document, SITUATION_HEADING)
        .ok_or_else(|| ParseError::HeadingNotFound(SITUATION_HEADING.to_string()))?;
    let table = table_after(document, heading)
        .ok_or_else(|| ParseError::TableNotFound(SITUATION_HEADING.to_string()))?;
    entries_from_table(table)
}

fn find_heading<'a>(document: &'a Html, heading_text: &str) -> Option<ElementRef<'a>> {
    document
        .select(&HEADING_SELECTOR)
        .find(|heading| element_text(*heading).trim() == heading_text)
}

fn table_after<'a>(document: &'a Html, heading: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let heading_id = heading.id();
    document
        .tree
        .root()
        .descendants()
        .skip_while(|node| node.id() != heading_id)
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "table")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Rows and cells are taken from the table itself only: rows of a table
/// nested in a cell are not part of it. A body row's leading
/// `<th scope="row">` counts as a cell so values stay aligned with headers.
fn entries_from_table(table: ElementRef<'_>) -> Result<Vec<RegulatoryEntry>, ParseError> {
    let rows = own_rows(table);

    let header_row = rows
        .iter()
        .find(|row| own_cells(**row).any(|cell| cell.value().name() == "th"))
        .or_else(|| rows.first());
    let Some(header_row) = header_row else {
        return Err(ParseError::MissingColumn(CODE_LABEL.to_string()));
    };

    let labels: Vec<String> = own_cells(*header_row)
        .map(|cell| element_text(cell).trim().to_owned())
        .collect();
    let columns = Columns::from_labels(&labels)?;

    let entries = rows
        .iter()
        .filter(|row| row.id() != header_row.id())
        .filter(|row| own_cells(**row).any(|cell| cell.value().name() == "td"))
        .map(|row| {
            let cells: Vec<String> = own_cells(*row).map(element_text).collect();
            columns.entry(&cells)
        })
        .collect();

    Ok(entries)
}

/// `<tr>` elements belonging to `table`, directly or through its row groups.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|row| row.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// `<th>` and `<td>` children of one row, in order.
fn own_cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "th" | "td"))
}

/// Column index of each known field in the rubrique table.
#[derive(Debug, Default)]
struct Columns {
    code: usize,
    sub_code: Option<usize>,
    authorization_date: Option<usize>,
    activity_status: Option<usize>,
    authorization_regime: Option<usize>,
    activity_description: Option<usize>,
    volume: Option<usize>,
    unit: Option<usize>,
}

impl Columns {
    fn from_labels(labels: &[String]) -> Result<Self, ParseError> {
        let mut code = None;
        let mut columns = Columns::default();

        for (index, label) in labels.iter().enumerate() {
            let slot = match normalize_label(label).as_str() {
                "Rubri. IC" => &mut code,
                "Ali." => &mut columns.sub_code,
                "Date auto." => &mut columns.authorization_date,
                "Etat d'activité" | "État d'activité" => &mut columns.activity_status,
                "Régime autorisé" => &mut columns.authorization_regime,
                "Activité" => &mut columns.activity_description,
                "Volume" => &mut columns.volume,
                "Unité" => &mut columns.unit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(index);
            }
        }

        columns.code = code.ok_or_else(|| ParseError::MissingColumn(CODE_LABEL.to_string()))?;
        Ok(columns)
    }

    /// Builds an entry from one body row. Short rows yield empty values for
    /// the columns they lack.
    fn entry(&self, cells: &[String]) -> RegulatoryEntry {
        let cell = |index: usize| cells.get(index).cloned().unwrap_or_default();
        let required = |index: Option<usize>| index.map(cell).unwrap_or_default();

        RegulatoryEntry {
            code: cell(self.code),
            sub_code: self.sub_code.map(cell),
            authorization_date: required(self.authorization_date),
            activity_status: required(self.activity_status),
            authorization_regime: required(self.authorization_regime),
            activity_description: required(self.activity_description),
            volume: self.volume.map(cell),
            unit: self.unit.map(cell),
        }
    }
}

/// Strips a trailing footnote marker such as `(3)` from a trimmed label.
fn normalize_label(label: &str) -> String {
    FOOTNOTE_MARKER.replace(label, "").into_owned()
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
