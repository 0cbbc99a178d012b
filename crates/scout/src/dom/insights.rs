// ABOUTME: Key-insight extraction: picks up to three sentences carrying research or advice cues.
// ABOUTME: Cues are a RegexSet so the list can be tuned without touching the scan.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Maximum number of insights returned.
pub const MAX_INSIGHTS: usize = 3;
/// Sentences shorter than this, after trimming, are ignored.
pub const MIN_SENTENCE_LEN: usize = 20;
/// Text shorter than this yields no insights.
pub const MIN_TEXT_LEN: usize = 100;

/// Phrases that mark a sentence as an insight.
pub const INSIGHT_CUES: &[&str] = &[
    r"research shows?",
    r"studies? (show|indicate|suggest|find)",
    r"according to",
    r"experts? (say|believe|recommend)",
    r"key (finding|insight|takeaway)",
    r"importantly?",
    r"surprisingly?",
    r"(tip|advice|recommendation)",
    r"the (secret|key) (to|is)",
];

static CUES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(INSIGHT_CUES.iter().map(|c| format!("(?i){c}"))).expect("valid cue set")
});

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

/// Returns up to [`MAX_INSIGHTS`] cue-bearing sentences in text order, each ending with a period.
pub fn extract_key_insights(text: &str) -> Vec<String> {
    if text.chars().count() < MIN_TEXT_LEN {
        return Vec::new();
    }
    SENTENCE_END
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() >= MIN_SENTENCE_LEN)
        .filter(|s| CUES.is_match(s))
        .take(MAX_INSIGHTS)
        .map(|s| format!("{s}."))
        .collect()
}
