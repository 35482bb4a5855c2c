//! Finding a named section and the table that belongs to it.
//!
//! Article markup is not consistent: the same "Medal table" section is an
//! `<h2>` on one page and an `<h3>` on the next, and the table can sit behind
//! any number of paragraphs, hatnotes and image blocks. Both lookups are
//! therefore ordered fallback chains that return `None` instead of failing.

use crate::document::{Document, has_class, is_tag, next_element_siblings, parent_element, text_of};
use crate::table::Table;
use scraper::ElementRef;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn tag(self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
        }
    }
}

/// Heading levels in the order they are tried.
pub const HEADING_PRIORITY: [HeadingLevel; 3] = [HeadingLevel::H2, HeadingLevel::H3, HeadingLevel::H1];

/// How a heading's text is compared with what we are looking for.
#[derive(Debug, Clone, Copy)]
pub enum HeadingMatch<'q> {
    /// Case-insensitive equality with the whole heading text.
    Exact(&'q str),
    /// Case-insensitive: the heading text contains every one of the words.
    AllWords(&'q [&'q str]),
}

impl HeadingMatch<'_> {
    pub fn matches(&self, heading_text: &str) -> bool {
        match self {
            HeadingMatch::Exact(label) => heading_text.trim().eq_ignore_ascii_case(label.trim()),
            HeadingMatch::AllWords(words) => {
                let lowered = heading_text.to_lowercase();
                !words.is_empty() && words.iter().all(|w| lowered.contains(&w.to_lowercase()))
            }
        }
    }
}

/// A heading located inside a document.
#[derive(Debug, Clone)]
pub struct Heading<'a> {
    pub element: ElementRef<'a>,
    pub level: HeadingLevel,
    pub label: String,
}

/// Find the first heading matching `wanted`, trying `<h2>`, then `<h3>`,
/// then `<h1>`. A lower-priority level is only searched when no heading of
/// the levels before it matched.
pub fn locate_section<'a>(doc: &'a Document, wanted: HeadingMatch<'_>) -> Option<Heading<'a>> {
    locate_section_in(doc, wanted, &HEADING_PRIORITY)
}

pub fn locate_section_in<'a>(
    doc: &'a Document,
    wanted: HeadingMatch<'_>,
    levels: &[HeadingLevel],
) -> Option<Heading<'a>> {
    for level in levels {
        let found = doc.elements_by_tag(level.tag()).find_map(|element| {
            let label = text_of(element);
            wanted.matches(&label).then_some(Heading {
                element,
                level: *level,
                label,
            })
        });

        if let Some(heading) = found {
            debug!("Found section '{}' as {}", heading.label, level.tag());
            return Some(heading);
        }
    }

    debug!("No section matching {:?} in {}", wanted, doc.locator());
    None
}

/// Stop predicate: the element is a `<table>`.
pub fn is_table(el: ElementRef<'_>) -> bool {
    is_tag(el, "table")
}

/// Stop predicate: the element is a `<table>` or carries `class`.
pub fn is_table_or_class(class: &str) -> impl Fn(ElementRef<'_>) -> bool + '_ {
    move |el| is_tag(el, "table") || has_class(el, class)
}

/// Walk forward from `anchor` to the first element satisfying `stop`.
///
/// The walk starts at the siblings that follow the anchor's parent (the
/// wrapper `<div>` modern article markup puts around a heading) and never
/// descends into them. Only when that finds nothing are the anchor's own
/// following siblings tried, which covers pages that put headings straight
/// into the content container.
pub fn find_table_after<'a, P>(anchor: ElementRef<'a>, stop: P) -> Option<Table<'a>>
where
    P: Fn(ElementRef<'a>) -> bool,
{
    let strategies: [fn(ElementRef<'a>) -> Option<ElementRef<'a>>; 2] = [
        parent_element,
        Some,
    ];

    for start in strategies {
        if let Some(from) = start(anchor)
            && let Some(found) = next_element_siblings(from).find(|el| stop(*el))
        {
            return Some(Table::new(found));
        }
    }

    None
}

/// Convenience: locate a section and the table after it.
pub fn section_table<'a>(doc: &'a Document, wanted: HeadingMatch<'_>) -> Option<Table<'a>> {
    let heading = locate_section(doc, wanted)?;
    find_table_after(heading.element, is_table)
}
