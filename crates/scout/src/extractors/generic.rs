// ABOUTME: Generic title and description extraction shared by every page.
// ABOUTME: Expressed as ordered selector lists evaluated by the select interpreter.

use once_cell::sync::Lazy;
use scraper::Html;

use crate::extractors::custom::SelectorSpec;
use crate::extractors::select::{query_first_match, Match};

/// Title candidates in priority order.
pub static TITLE_SELECTORS: Lazy<Vec<SelectorSpec>> = Lazy::new(|| {
    vec![
        SelectorSpec::attr("meta[property=\"og:title\"]", "content"),
        SelectorSpec::attr("meta[name=\"og:title\"]", "content"),
        SelectorSpec::attr("meta[name=\"title\"]", "content"),
        SelectorSpec::text("title"),
        SelectorSpec::text("h1.entry-title"),
        SelectorSpec::text("h1.workout-title"),
        SelectorSpec::text("h1"),
    ]
});

/// Description candidates in priority order.
pub static DESCRIPTION_SELECTORS: Lazy<Vec<SelectorSpec>> = Lazy::new(|| {
    vec![
        SelectorSpec::attr("meta[property=\"og:description\"]", "content"),
        SelectorSpec::attr("meta[name=\"og:description\"]", "content"),
        SelectorSpec::attr("meta[name=\"description\"]", "content"),
        SelectorSpec::attr("meta[name=\"twitter:description\"]", "content"),
        SelectorSpec::text(".workout-description"),
        SelectorSpec::text(".entry-content p"),
    ]
});

pub fn generic_title(doc: &Html) -> Option<Match> {
    query_first_match(doc, &TITLE_SELECTORS)
}

pub fn generic_description(doc: &Html) -> Option<Match> {
    query_first_match(doc, &DESCRIPTION_SELECTORS)
}
