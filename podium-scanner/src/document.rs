//! Parsed pages and the small set of tree walks the extractors need.
//!
//! A [`Document`] owns its parsed tree. Everything handed out from it
//! ([`Node`], [`Link`], headings, tables, rows) borrows from the document and
//! cannot outlive it.

use scraper::{ElementRef, Html};

/// One fetched page.
pub struct Document {
    locator: String,
    html: Html,
}

impl Document {
    pub fn parse(locator: impl Into<String>, body: &str) -> Self {
        Self {
            locator: locator.into(),
            html: Html::parse_document(body),
        }
    }

    /// The locator this document was fetched from.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// The `<html>` element.
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// All elements with the given tag, in document order.
    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        descendants_by_tag(self.root(), tag)
    }

    /// All elements carrying every one of `classes`, in document order.
    pub fn elements_with_classes<'a>(
        &'a self,
        tag: Option<&'a str>,
        classes: &'a [&'a str],
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        descendant_elements(self.root()).filter(move |el| {
            tag.is_none_or(|t| is_tag(*el, t)) && classes.iter().all(|c| has_class(*el, c))
        })
    }

    /// The first `table.infobox` on the page.
    pub fn infobox(&self) -> Option<ElementRef<'_>> {
        self.elements_with_classes(Some("table"), &["infobox"]).next()
    }

    pub fn infoboxes(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.elements_with_classes(Some("table"), &["infobox"])
    }

    /// Every `<a href>` on the page.
    pub fn links(&self) -> Vec<Link<'_>> {
        links_in(self.root())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

/// A child of an element: either another element or a run of text.
///
/// Comments, doctypes and processing instructions are not nodes here.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

/// A hyperlink: what the reader sees and where it points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link<'a> {
    pub text: String,
    pub href: &'a str,
}

impl<'a> Link<'a> {
    pub fn from_anchor(anchor: ElementRef<'a>) -> Option<Self> {
        let href = anchor.value().attr("href")?;
        Some(Self {
            text: text_of(anchor),
            href,
        })
    }
}

/// Direct children of `el`, elements and text, in document order.
pub fn children(el: ElementRef<'_>) -> impl Iterator<Item = Node<'_>> {
    el.children().filter_map(|child| match child.value() {
        scraper::Node::Text(text) => Some(Node::Text(&**text)),
        scraper::Node::Element(_) => ElementRef::wrap(child).map(Node::Element),
        _ => None,
    })
}

/// Direct element children of `el`.
pub fn child_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

/// `el` itself followed by every element below it, in document order.
pub fn descendant_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.descendants().filter_map(ElementRef::wrap)
}

/// Elements with the given tag at or below `el`, in document order.
pub fn descendants_by_tag<'a>(el: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    descendant_elements(el).filter(move |e| is_tag(*e, tag))
}

/// Element siblings after `el`, nearest first.
pub fn next_element_siblings(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn is_tag(el: ElementRef<'_>, tag: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(tag)
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// All text below `el`, whitespace collapsed and trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Only the text nodes that are direct children of `el`.
pub fn own_text(el: ElementRef<'_>) -> String {
    let raw: String = children(el)
        .filter_map(|node| match node {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        })
        .collect();
    normalize_ws(&raw)
}

/// Every `<a href>` at or below `el`.
pub fn links_in(el: ElementRef<'_>) -> Vec<Link<'_>> {
    descendants_by_tag(el, "a")
        .filter_map(Link::from_anchor)
        .collect()
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
