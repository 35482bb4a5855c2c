//! Flattening of cells that mix prose with links.
//!
//! Infobox values such as "Lausanne, Switzerland" or "Paris, France[1]" are
//! a blend of text nodes, anchors and italics. Only those three contribute;
//! anything else (footnote superscripts, hidden spans, images) is dropped.

use crate::document::{Node, children, is_tag, normalize_ws, text_of};
use scraper::ElementRef;

/// Render the mixed content of `el` as one normalised string.
///
/// Direct text children and direct anchors contribute their text. A direct
/// `<i>` contributes its own text children and anchors, one level deep.
pub fn render_mixed(el: ElementRef<'_>) -> String {
    let mut combined = String::new();

    for node in children(el) {
        match node {
            Node::Text(text) => push_fragment(&mut combined, text),
            Node::Element(child) if is_tag(child, "a") => {
                push_fragment(&mut combined, &text_of(child));
            }
            Node::Element(child) if is_tag(child, "i") => {
                for inner in children(child) {
                    match inner {
                        Node::Text(text) => push_fragment(&mut combined, text),
                        Node::Element(grandchild) if is_tag(grandchild, "a") => {
                            push_fragment(&mut combined, &text_of(grandchild));
                        }
                        Node::Element(_) => {}
                    }
                }
            }
            Node::Element(_) => {}
        }
    }

    normalize_ws(&combined)
}

// Whitespace inside a fragment is collapsed but its edges are kept so that
// "Lausanne, " + "Switzerland" still reads as two words.
fn push_fragment(out: &mut String, fragment: &str) {
    if fragment.is_empty() {
        return;
    }

    let mut prev_space = false;
    for ch in fragment.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
}
