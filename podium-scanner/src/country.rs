//! Which country does a place page belong to?
//!
//! Ordinary city pages have a "Country" row in their infobox. Japanese cities
//! only name their prefecture, and special administrative regions name a
//! "Sovereign state" instead. Each shape gets its own strategy; strategies
//! run in order and the first answer wins.

use crate::document::{
    Document, descendants_by_tag, is_tag, next_element_siblings, parent_element, text_of,
};
use scraper::ElementRef;
use tracing::debug;

pub type CountryStrategy = fn(&Document) -> Option<String>;

/// Resolution strategies in the order they are tried.
pub const COUNTRY_STRATEGIES: [(&str, CountryStrategy); 2] = [
    ("country header", from_country_header),
    ("infobox division", from_infobox_division),
];

/// Country a place page belongs to, or `None` if no strategy can tell.
pub fn resolve_country(doc: &Document) -> Option<String> {
    for (name, strategy) in COUNTRY_STRATEGIES {
        if let Some(country) = strategy(doc) {
            debug!("{} resolved to '{}' via {}", doc.locator(), country, name);
            return Some(country);
        }
    }

    debug!("No country found for {}", doc.locator());
    None
}

/// A header cell reading "Country": the last anchor of its row, or failing
/// that the text of the next data cell.
pub fn from_country_header(doc: &Document) -> Option<String> {
    let header = doc
        .elements_by_tag("th")
        .find(|th| text_of(*th).eq_ignore_ascii_case("country"))?;

    parent_element(header)
        .and_then(|row| last_named_anchor(row, None))
        .or_else(|| next_data_cell_text(header))
}

/// A page with an infobox that links to "Prefecture" is Japanese. Otherwise a
/// "Sovereign state" link names the country two levels up.
pub fn from_infobox_division(doc: &Document) -> Option<String> {
    doc.infobox()?;

    let anchor_named = |label: &str| {
        doc.elements_by_tag("a")
            .find(|a| text_of(*a).eq_ignore_ascii_case(label))
    };

    if anchor_named("prefecture").is_some() {
        return Some("Japan".to_string());
    }

    let sovereign = anchor_named("sovereign state")?;
    let label_cell = parent_element(sovereign)?;

    parent_element(label_cell)
        .and_then(|row| last_named_anchor(row, Some(sovereign)))
        .or_else(|| next_data_cell_text(label_cell))
}

/// Text of the last anchor at or below `el` that reads like a name. Empty
/// anchors, citation markers such as `[1]` and the `label` anchor itself are
/// passed over.
fn last_named_anchor(el: ElementRef<'_>, label: Option<ElementRef<'_>>) -> Option<String> {
    descendants_by_tag(el, "a")
        .filter(|a| label.is_none_or(|l| l.id() != a.id()))
        .map(text_of)
        .filter(|text| !text.is_empty() && !is_citation(text))
        .last()
}

fn next_data_cell_text(el: ElementRef<'_>) -> Option<String> {
    next_element_siblings(el)
        .find(|sib| is_tag(*sib, "td"))
        .map(text_of)
        .filter(|text| !text.is_empty())
}

fn is_citation(text: &str) -> bool {
    text.starts_with('[') && text.ends_with(']')
}
