//! Checkbox value extraction from discovery responses
//!
//! The discovery endpoint returns an HTML fragment with a slot grid. Each
//! bookable cell holds a checkbox whose `value` is a court identifier.

use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Ordered table lookup strategies; the first selector that matches wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePolicy {
    pub selectors: Vec<String>,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            selectors: vec![
                "table.stbl_l1a.con_wid".to_string(),
                "table.stbl_l1a".to_string(),
                "table".to_string(),
            ],
        }
    }
}

impl TablePolicy {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    /// Find the first table matched by the policy
    fn locate<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ExtractError> {
        for (i, raw) in self.selectors.iter().enumerate() {
            let selector = parse_selector(raw)?;
            if let Some(table) = document.select(&selector).next() {
                if i > 0 {
                    tracing::debug!("Table found with fallback selector {:?}", raw);
                }
                return Ok(table);
            }
            tracing::debug!("No table matched {:?}", raw);
        }
        Err(ExtractError::NoTable)
    }
}

fn parse_selector(raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|e| ExtractError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Extract the checkbox value at a 1-based `(row, col)` using the default
/// table policy
pub fn extract_checkbox_value(html: &str, row: usize, col: usize) -> Result<String, ExtractError> {
    extract_with_policy(html, &TablePolicy::default(), row, col)
}

/// Extract the checkbox value at a 1-based `(row, col)`.
///
/// Rows are every `tr` in the located table, cells are every `td` in that
/// row. The value is returned as-is; format checks happen when the family
/// is derived.
pub fn extract_with_policy(
    html: &str,
    policy: &TablePolicy,
    row: usize,
    col: usize,
) -> Result<String, ExtractError> {
    let document = Html::parse_document(html);
    let table = policy.locate(&document)?;

    let tr_selector = parse_selector("tr")?;
    let td_selector = parse_selector("td")?;
    let checkbox_selector = parse_selector("input[type=\"checkbox\"]")?;

    let rows: Vec<_> = table.select(&tr_selector).collect();
    tracing::debug!(rows = rows.len(), "Located slot table");
    let target_row = row
        .checked_sub(1)
        .and_then(|i| rows.get(i))
        .ok_or(ExtractError::RowOutOfRange {
            index: row,
            available: rows.len(),
        })?;

    let cells: Vec<_> = target_row.select(&td_selector).collect();
    let target_cell = col
        .checked_sub(1)
        .and_then(|i| cells.get(i))
        .ok_or(ExtractError::CellOutOfRange {
            index: col,
            available: cells.len(),
        })?;

    let checkbox = target_cell
        .select(&checkbox_selector)
        .next()
        .ok_or(ExtractError::NoCheckbox)?;

    match checkbox.value().attr("value") {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ExtractError::EmptyValue),
    }
}
