// ABOUTME: Selector-list interpreter: evaluates ordered (selector, attribute-or-text) pairs against a document.
// ABOUTME: query_first returns the first non-empty value; query_all returns every value from the winning selector.

//! Selector-based field extraction.
//!
//! Key behaviors:
//! - Selectors are tried in order; the first selector yielding a non-empty value wins.
//! - Within a selector, all matched elements are read in document order, not just the first.
//! - `Css(s)` reads element text with whitespace normalized.
//! - `CssAttr([s, attr])` reads the attribute value, trimmed.
//! - Invalid selectors are skipped, never fatal.

use scraper::{ElementRef, Html};

use crate::dom::normalize_whitespace;
use crate::extractors::compiled::get_or_compile;
use crate::extractors::custom::{parse_selector, SelectorSpec};

/// A value found by the interpreter, with the selector that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub value: String,
    pub selector: String,
}

fn value_of(el: &ElementRef, attr: Option<&str>) -> Option<String> {
    let value = match attr {
        Some(attr) => el.value().attr(attr).map(|v| v.trim().to_string())?,
        None => normalize_whitespace(&el.text().collect::<String>()),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn values_for_spec(doc: &Html, spec: &SelectorSpec) -> Vec<String> {
    let (css, attr) = parse_selector(spec);
    if css.is_empty() {
        return Vec::new();
    }
    let Some(sel) = get_or_compile(&css) else {
        return Vec::new();
    };
    doc.select(&sel)
        .filter_map(|el| value_of(&el, attr.as_deref()))
        .collect()
}

/// Returns the first non-empty value produced by the selector list, with its selector.
///
/// Every element a selector matches is considered, in document order, so an
/// empty first match (e.g. a blank `og:title`) falls through to the next
/// element of the same selector before the next selector is tried.
pub fn query_first_match(doc: &Html, specs: &[SelectorSpec]) -> Option<Match> {
    for spec in specs {
        if let Some(value) = values_for_spec(doc, spec).into_iter().next() {
            return Some(Match {
                value,
                selector: parse_selector(spec).0,
            });
        }
    }
    None
}

/// Returns the first non-empty value produced by the selector list.
pub fn query_first(doc: &Html, specs: &[SelectorSpec]) -> Option<String> {
    query_first_match(doc, specs).map(|m| m.value)
}

/// Returns every non-empty value of the first selector that matches anything.
///
/// `limit` caps how many values are kept from the winning selector.
pub fn query_all(
    doc: &Html,
    specs: &[SelectorSpec],
    limit: Option<usize>,
) -> Option<(Vec<String>, String)> {
    for spec in specs {
        let mut values = values_for_spec(doc, spec);
        if values.is_empty() {
            continue;
        }
        if let Some(limit) = limit {
            values.truncate(limit);
        }
        return Some((values, parse_selector(spec).0));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Page Title</title>
            <meta property="og:title" content="  ">
            <meta name="title" content="Meta Title">
        </head>
        <body>
            <h1>  Main   Title  </h1>
            <ul class="items">
                <li>Item One</li>
                <li>Item Two</li>
                <li>Item Three</li>
            </ul>
            <div class="empty"></div>
        </body>
        </html>
    "#;

    fn css(s: &str) -> SelectorSpec {
        SelectorSpec::Css(s.to_string())
    }

    fn attr(s: &str, a: &str) -> SelectorSpec {
        SelectorSpec::CssAttr(vec![s.to_string(), a.to_string()])
    }

    #[test]
    fn first_non_empty_wins_in_priority_order() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let specs = vec![
            attr("meta[property='og:title']", "content"),
            attr("meta[name='title']", "content"),
            css("title"),
        ];
        let found = query_first_match(&doc, &specs).unwrap();
        assert_eq!(found.value, "Meta Title");
        assert_eq!(found.selector, "meta[name='title']");
    }

    #[test]
    fn text_is_whitespace_normalized() {
        let doc = Html::parse_document(SAMPLE_HTML);
        assert_eq!(query_first(&doc, &[css("h1")]), Some("Main Title".to_string()));
    }

    #[test]
    fn empty_and_missing_fall_through() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let specs = vec![css("div.empty"), css("article"), css("title")];
        assert_eq!(query_first(&doc, &specs), Some("Page Title".to_string()));
    }

    #[test]
    fn blank_first_element_falls_through_to_later_match() {
        let doc = Html::parse_document(
            r#"<html><head>
                <meta property="og:title" content="">
                <meta property="og:title" content="Second Tag">
                <title>Doc</title>
            </head></html>"#,
        );
        let specs = vec![attr("meta[property='og:title']", "content"), css("title")];
        let found = query_first_match(&doc, &specs).unwrap();
        assert_eq!(found.value, "Second Tag");
        assert_eq!(found.selector, "meta[property='og:title']");
    }

    #[test]
    fn invalid_selector_is_skipped() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let specs = vec![css("[[[invalid"), css("h1")];
        assert_eq!(query_first(&doc, &specs), Some("Main Title".to_string()));
        assert_eq!(query_first(&doc, &[css("[[[invalid")]), None);
    }

    #[test]
    fn query_all_returns_winning_selector_values() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let specs = vec![css(".missing li"), css("ul.items li"), css("h1")];
        let (values, selector) = query_all(&doc, &specs, None).unwrap();
        assert_eq!(values, vec!["Item One", "Item Two", "Item Three"]);
        assert_eq!(selector, "ul.items li");
    }

    #[test]
    fn query_all_respects_limit() {
        let doc = Html::parse_document(SAMPLE_HTML);
        let (values, _) = query_all(&doc, &[css("ul.items li")], Some(2)).unwrap();
        assert_eq!(values, vec!["Item One", "Item Two"]);
    }
}
