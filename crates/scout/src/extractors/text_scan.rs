// ABOUTME: Raw-text exercise scanner used when a fitness page has no structural workout sections.
// ABOUTME: Regex-scans page text for exercise names next to set/rep counts, dropping navigation noise.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::dom::{body_raw_text, element_text, normalize_whitespace, select_all};
use crate::extractors::patterns::{
    is_navigation_noise, is_widget_noise, mentions_known_exercise, mentions_sets_and_reps,
    COMMON_EXERCISE_NAMES,
};

/// Matches kept per pattern.
pub const MAX_PATTERN_MATCHES: usize = 20;
/// Matches kept per exercise name.
pub const MAX_NAME_MATCHES: usize = 3;
/// Numbered or bulleted lines kept.
pub const MAX_LIST_LINES: usize = 10;

const MOVEMENTS: &str = "press|squat|curl|row|pull|push|fly|raise|extension|lunge|dip";

static SCHEME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "Bench Press: 3 sets of 8"
        format!(r"(?i)([\w\s]+(?:{MOVEMENTS})[\w\s]*)\s*[-:]\s*(\d+[\w\s,x×-]+)"),
        // "3x8 Bench Press"
        format!(r"(?i)(\d+\s*[x×]\s*\d+)\s+([\w\s]+(?:{MOVEMENTS})[\w\s]*)"),
        // "Bench Press – 3 sets x 8 reps"
        format!(r"(?i)([\w\s]+(?:{MOVEMENTS})[\w\s]*)\s*[-–]\s*(\d+[\w\s,x×-]+)"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    COMMON_EXERCISE_NAMES
        .iter()
        .map(|name| {
            let pattern = format!(
                r"(?i)({}[^.]*?(?:\d+[^.]*?(?:set|rep|x|×)[^.]*?){{1,2}})",
                regex::escape(name)
            );
            Regex::new(&pattern).expect("valid regex")
        })
        .collect()
});

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\.|[-•])\s*").expect("valid regex"));

fn in_range(text: &str, min_exclusive: usize, max_exclusive: usize) -> bool {
    let len = text.chars().count();
    len > min_exclusive && len < max_exclusive
}

/// Scans visible page text and workout tables for exercise mentions, in discovery order, deduplicated.
pub fn scan_exercise_mentions(doc: &Html) -> Vec<String> {
    let mut found = scan_text(&body_raw_text(doc));

    for container in select_all(doc, "table, .workout-table, .exercise-table, .routine-table") {
        let text = element_text(&container);
        if in_range(&text, 20, 500)
            && mentions_sets_and_reps(&text)
            && mentions_known_exercise(&text)
            && !is_widget_noise(&text)
        {
            found.push(text);
        }
    }

    let mut seen = HashSet::new();
    found.retain(|m| seen.insert(m.clone()));
    found
}

/// Scans raw text with the scheme patterns, the per-name patterns, and list-line detection.
pub fn scan_text(text: &str) -> Vec<String> {
    let mut found = Vec::new();

    for pattern in SCHEME_PATTERNS.iter() {
        for m in pattern.find_iter(text).take(MAX_PATTERN_MATCHES) {
            let line = normalize_whitespace(m.as_str());
            if in_range(&line, 5, 150) && !is_navigation_noise(&line) {
                found.push(line);
            }
        }
    }

    for pattern in NAME_PATTERNS.iter() {
        for m in pattern.find_iter(text).take(MAX_NAME_MATCHES) {
            let line = normalize_whitespace(m.as_str());
            if in_range(&line, 15, 100) && !is_navigation_noise(&line) {
                found.push(line);
            }
        }
    }

    let list_lines = text
        .lines()
        .map(str::trim)
        .filter(|line| LIST_MARKER.is_match(line))
        .filter(|line| mentions_sets_and_reps(line) && mentions_known_exercise(line))
        .filter(|line| in_range(line, 20, 150) && !is_navigation_noise(line))
        .take(MAX_LIST_LINES)
        .map(|line| LIST_MARKER.replace(line, "").into_owned());
    found.extend(list_lines);

    found
}
