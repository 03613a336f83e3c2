//! Markup stripping for answer text
//!
//! Answers come from a backend we don't control and may carry HTML. The
//! terminal never interprets it; we show the text content instead.

use scraper::{ElementRef, Html, Node};
use std::borrow::Cow;

/// Elements whose content is never shown
const HIDDEN: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Elements that end a line when they close
const BLOCKS: &[&str] = &[
    "p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "table",
    "ul", "ol",
];

/// Reduce possibly-marked-up text to what a browser would show
pub fn strip_markup(input: &str) -> Cow<'_, str> {
    if !input.contains('<') && !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let fragment = Html::parse_fragment(input);
    let mut output = String::with_capacity(input.len());
    collect_text(fragment.root_element(), &mut output);
    Cow::Owned(output)
}

fn collect_text(element: ElementRef<'_>, output: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => output.push_str(&text.text),
            Node::Element(elem) => {
                let tag = elem.name();
                if tag == "br" {
                    output.push('\n');
                    continue;
                }
                if HIDDEN.contains(&tag) {
                    continue;
                }
                if let Some(element_ref) = ElementRef::wrap(child) {
                    collect_text(element_ref, output);
                }
                if BLOCKS.contains(&tag) {
                    output.push('\n');
                }
            }
            // Comments, doctypes, processing instructions
            _ => {}
        }
    }
}
