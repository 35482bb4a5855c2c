//! Tables, rows and the row-level extractors queries are built from.
//!
//! Column positions are counted from the end of a row because the leading
//! columns (rank, flag, name) vary between pages while the medal columns do
//! not. This is still positional and breaks if a page reorders its columns.

use crate::document::{Link, descendants_by_tag, links_in, text_of};
use crate::error::{Result, ScanError};
use scraper::ElementRef;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    All,
    /// Drop the first row, whatever it contains.
    SkipHeader,
}

/// A table-shaped element and its rows.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    element: ElementRef<'a>,
}

impl<'a> Table<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    /// Every `<tr>` below the table, in document order.
    pub fn rows(&self, selection: RowSelection) -> Vec<Row<'a>> {
        let rows = descendants_by_tag(self.element, "tr").map(Row::new);
        match selection {
            RowSelection::All => rows.collect(),
            RowSelection::SkipHeader => rows.skip(1).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    element: ElementRef<'a>,
}

impl<'a> Row<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    /// Data cells (`<td>`).
    pub fn data_cells(&self) -> Vec<ElementRef<'a>> {
        descendants_by_tag(self.element, "td").collect()
    }

    /// Header cells (`<th>`).
    pub fn header_cells(&self) -> Vec<ElementRef<'a>> {
        descendants_by_tag(self.element, "th").collect()
    }

    /// The data cell `offset` places from the end; `1` is the last cell.
    pub fn data_cell_from_end(&self, offset: usize) -> Option<ElementRef<'a>> {
        let cells = self.data_cells();
        if offset == 0 || cells.len() < offset {
            return None;
        }
        cells.get(cells.len() - offset).copied()
    }

    pub fn links(&self) -> Vec<Link<'a>> {
        links_in(self.element)
    }

    pub fn first_link(&self) -> Option<Link<'a>> {
        descendants_by_tag(self.element, "a")
            .find_map(Link::from_anchor)
    }

    /// Text of the first anchor in the row, even one without an href.
    pub fn first_anchor_text(&self) -> Option<String> {
        descendants_by_tag(self.element, "a").next().map(text_of)
    }
}

/// Parse the trimmed text of a cell as an integer.
pub fn parse_int_cell(cell: ElementRef<'_>, field: &str) -> Result<i64> {
    let raw = text_of(cell);
    raw.parse::<i64>().map_err(|_| ScanError::ParseError {
        field: field.to_string(),
        value: raw,
    })
}

/// Sum the cell `column_from_end` over every row whose first anchor reads
/// exactly `key`.
///
/// Rows without an anchor or without enough cells add nothing. A matching
/// row whose cell is not an integer fails the whole sum.
pub fn sum_by_key_and_column(table: &Table<'_>, key: &str, column_from_end: usize) -> Result<i64> {
    let mut total = 0;

    for row in table.rows(RowSelection::All) {
        let Some(name) = row.first_anchor_text() else {
            continue;
        };
        if name != key {
            continue;
        }
        if let Some(cell) = row.data_cell_from_end(column_from_end) {
            total += parse_int_cell(cell, key)?;
        }
    }

    Ok(total)
}

/// Names (first anchor text) of every row whose cell `column_from_end` is at
/// least `threshold`.
///
/// Rows with fewer data cells than `column_from_end` are skipped rather
/// than read as zero. A cell that is not an integer fails the whole filter.
pub fn filter_by_threshold(
    table: &Table<'_>,
    column_from_end: usize,
    threshold: i64,
) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();

    for row in table.rows(RowSelection::All) {
        let Some(cell) = row.data_cell_from_end(column_from_end) else {
            continue;
        };
        let name = row.first_anchor_text();
        let value = parse_int_cell(cell, name.as_deref().unwrap_or("unnamed row"))?;
        if value >= threshold
            && let Some(name) = name
        {
            names.insert(name);
        }
    }

    Ok(names)
}

/// Map every selected row through `pick`, keeping the values it returns.
pub fn collect_by_predicate<'a, T, F>(table: &Table<'a>, selection: RowSelection, pick: F) -> Vec<T>
where
    F: FnMut(&Row<'a>) -> Option<T>,
{
    table.rows(selection).iter().filter_map(pick).collect()
}
