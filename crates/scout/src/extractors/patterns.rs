// ABOUTME: Named heuristic predicates for recognizing workout tables, section labels, and exercise lines.
// ABOUTME: Each heuristic is a standalone function so it can be tested against literal page fragments.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;

fn keyword_matcher(words: &[&str]) -> AhoCorasick {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostFirst)
        .build(words)
        .unwrap_or_else(|_| AhoCorasick::new(Vec::<&str>::new()).expect("empty automaton"))
}

/// Words that mark a table as workout content.
static WORKOUT_TABLE_KEYWORDS: Lazy<AhoCorasick> = Lazy::new(|| {
    keyword_matcher(&["exercise", "sets", "reps", "rest", "weight", "muscle", "day"])
});

/// Words that mark a first table row as a header row.
static HEADER_TERMS: Lazy<AhoCorasick> =
    Lazy::new(|| keyword_matcher(&["exercise", "sets", "reps"]));

/// Words that make short paragraph or bold text a section label.
static SECTION_WORDS: Lazy<AhoCorasick> = Lazy::new(|| {
    keyword_matcher(&["day", "week", "workout", "training", "phase", "session"])
});

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(monday|tuesday|wednesday|thursday|friday|saturday|sunday)")
        .expect("valid regex")
});

static NUMBERED_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(day|week|phase)\s*\d+").expect("valid regex"));

static SET_REP_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s*(?:sets?|reps?|x|×)").expect("valid regex"));

static SETS_BY_REPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s*[x×]\s*\d+").expect("valid regex"));

static EXERCISE_TERMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)sets?|reps?|exercise|workout").expect("valid regex"));

static EXERCISE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)squat|press|curl|row|pull|push|fly|raise|extension|lunge|dip|deadlift|bench")
        .expect("valid regex")
});

static NAVIGATION_NOISE: Lazy<AhoCorasick> = Lazy::new(|| {
    keyword_matcher(&["store", "follow", "subscribe", "menu", "navigation"])
});

static SHARE_NOISE: Lazy<AhoCorasick> = Lazy::new(|| keyword_matcher(&["share"]));

/// Exercise names recognized by the raw-text scanner.
pub const COMMON_EXERCISE_NAMES: &[&str] = &[
    "squat",
    "deadlift",
    "bench press",
    "overhead press",
    "barbell row",
    "pull-up",
    "chin-up",
    "dip",
    "lunge",
    "leg press",
    "leg curl",
    "leg extension",
    "bicep curl",
    "tricep",
    "lateral raise",
    "shoulder press",
    "chest fly",
    "cable",
    "dumbbell",
    "barbell",
    "machine",
    "pushup",
    "push-up",
    "plank",
    "crunch",
    "sit-up",
    "romanian deadlift",
    "front squat",
    "incline",
    "decline",
];

static EXERCISE_NAME_LIST: Lazy<AhoCorasick> = Lazy::new(|| keyword_matcher(COMMON_EXERCISE_NAMES));

fn has_digit(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// A table is workout content when it mentions a workout keyword or a number,
/// has more than one row, and carries more than 20 characters of text.
pub fn looks_like_workout_table(text: &str, row_count: usize) -> bool {
    let text = text.trim();
    (WORKOUT_TABLE_KEYWORDS.is_match(text) || has_digit(text))
        && row_count > 1
        && char_len(text) > 20
}

/// First-row text that names exercise columns.
pub fn looks_like_header_row(text: &str) -> bool {
    HEADER_TERMS.is_match(text)
}

/// Heading-tag text usable as a section label.
pub fn is_heading_label(text: &str) -> bool {
    let len = char_len(text);
    len > 3 && len < 200
}

/// Short paragraph or bold text that names a workout section ("Day 1", "Monday - Legs", "Phase 2").
pub fn looks_like_section_label(text: &str) -> bool {
    let len = char_len(text);
    if len <= 5 || len >= 150 {
        return false;
    }
    SECTION_WORDS.is_match(text) || WEEKDAY_PREFIX.is_match(text) || NUMBERED_SECTION.is_match(text)
}

/// A number directly followed by sets, reps, or a multiplication sign.
pub fn has_set_rep_count(text: &str) -> bool {
    SET_REP_COUNT.is_match(text)
}

/// An explicit "NxM" scheme such as "3x8" or "4 × 10".
pub fn has_sets_by_reps(text: &str) -> bool {
    SETS_BY_REPS.is_match(text)
}

/// Mentions a common exercise movement.
pub fn has_exercise_name(text: &str) -> bool {
    EXERCISE_NAME.is_match(text)
}

/// Mentions one of [`COMMON_EXERCISE_NAMES`].
pub fn mentions_known_exercise(text: &str) -> bool {
    EXERCISE_NAME_LIST.is_match(text)
}

/// Mentions both sets and reps.
pub fn mentions_sets_and_reps(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("set") && lower.contains("rep")
}

/// A line that reads like a prescribed exercise.
pub fn looks_like_exercise_line(text: &str) -> bool {
    (has_digit(text) && EXERCISE_TERMS.is_match(text))
        || has_sets_by_reps(text)
        || mentions_sets_and_reps(text)
        || has_exercise_name(text)
}

/// A list item that reads like an exercise: long enough and numeric or set/rep related.
pub fn looks_like_exercise_item(text: &str) -> bool {
    if char_len(text) <= 10 {
        return false;
    }
    let lower = text.to_lowercase();
    has_digit(text) || lower.contains("set") || lower.contains("rep")
}

/// A list whose text mentions sets, reps, or exercises.
pub fn mentions_workout_terms(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("sets") || lower.contains("reps") || lower.contains("exercise")
}

/// Container text that suggests workout content worth scanning.
pub fn looks_like_workout_container(text: &str) -> bool {
    has_set_rep_count(text) || text.to_lowercase().contains("exercise")
}

/// Navigation or promotional phrasing that must not be reported as an exercise.
pub fn is_navigation_noise(text: &str) -> bool {
    NAVIGATION_NOISE.is_match(text)
}

/// Like [`is_navigation_noise`] but also rejects share widgets.
pub fn is_widget_noise(text: &str) -> bool {
    is_navigation_noise(text) || SHARE_NOISE.is_match(text)
}
