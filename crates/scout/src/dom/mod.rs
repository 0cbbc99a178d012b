// ABOUTME: DOM parsing and traversal utilities built on scraper's HTML document tree.
// ABOUTME: Provides parse(), textContent-style helpers, and subtree-skipping text collection.

//! DOM utilities for HTML document analysis.
//!
//! The parsed [`Html`] is owned by a single extraction call and never shared
//! across calls. Submodules:
//! - `article`: article-body isolation and smart truncation.
//! - `insights`: insight-sentence extraction from article text.

pub mod article;
pub mod insights;

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

use crate::extractors::compiled::get_or_compile;

/// Parses raw HTML into a queryable document. Never fails; malformed markup is repaired by html5ever.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Collapses runs of whitespace into single spaces and trims.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Raw concatenated text of an element, like DOM `textContent`.
pub fn raw_text(el: &ElementRef) -> String {
    el.text().collect::<String>()
}

/// Text of an element with whitespace normalized.
pub fn element_text(el: &ElementRef) -> String {
    normalize_whitespace(&raw_text(el))
}

/// Lowercased tag name of an element.
pub fn tag_name(el: &ElementRef) -> String {
    el.value().name().to_ascii_lowercase()
}

/// True for `h1`..`h6`.
pub fn is_heading(el: &ElementRef) -> bool {
    matches!(
        el.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

/// Returns elements matching `css` in document order; an invalid selector yields nothing.
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(sel) => doc.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Returns descendants of `el` matching `css` in document order.
pub fn select_within<'a>(el: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(sel) => el.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Element children of `el` (text and comment nodes skipped).
pub fn child_elements<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

/// Previous element siblings of `el`, nearest first.
pub fn prev_element_siblings<'a>(el: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.prev_siblings().filter_map(ElementRef::wrap)
}

/// Parent element of `el`, if any.
pub fn parent_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Text of `el` with every subtree matching `skip` removed, whitespace normalized.
pub fn text_excluding(el: &ElementRef, skip: &Selector) -> String {
    normalize_whitespace(&raw_text_excluding(el, skip))
}

/// Like [`text_excluding`] but keeps the original whitespace and line breaks.
pub fn raw_text_excluding(el: &ElementRef, skip: &Selector) -> String {
    let mut out = String::new();
    collect_text(**el, skip, &mut out);
    out
}

fn collect_text(node: NodeRef<Node>, skip: &Selector, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !skip.matches(&el) {
                        collect_text(child, skip, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Visible body text: the `<body>` text without script, style, and noscript content.
pub fn body_text(doc: &Html) -> String {
    normalize_whitespace(&body_raw_text(doc))
}

/// Visible body text with line breaks preserved.
pub fn body_raw_text(doc: &Html) -> String {
    let Some(skip) = get_or_compile("script, style, noscript, template") else {
        return String::new();
    };
    select_all(doc, "body")
        .first()
        .map(|body| raw_text_excluding(body, &skip))
        .unwrap_or_default()
}
