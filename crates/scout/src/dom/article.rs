// ABOUTME: Article-body isolation: finds the main content container and flattens its text.
// ABOUTME: Long bodies are cut with smart_truncate at the nearest sentence or word boundary.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::dom::{select_all, text_excluding};

/// Maximum length of the article excerpt.
pub const MAX_ARTICLE_LEN: usize = 500;
/// A sentence end is used only past this fraction of the window.
pub const SENTENCE_WINDOW: f64 = 0.6;
/// A word break is used only past this fraction of the window.
pub const WORD_WINDOW: f64 = 0.8;
/// Containers with this much text or less are skipped.
pub const MIN_ARTICLE_LEN: usize = 200;

const ELLIPSIS: &str = "...";

/// Content containers, most specific first.
const ARTICLE_SELECTORS: &[&str] = &[
    "article",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content",
    ".main-content",
    "main",
    ".blog-post",
    ".post-body",
    ".article-body",
    ".story-body",
    ".article-text",
    ".news-content",
    "#content",
    ".container .content",
    "[role=\"main\"]",
];

static STRIP: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style, nav, header, footer, aside, .sidebar, .comments, .social-share")
        .expect("valid selector")
});

/// Returns the flattened text of the first content container with more than
/// [`MIN_ARTICLE_LEN`] characters, truncated to [`MAX_ARTICLE_LEN`]. Empty if none qualifies.
pub fn extract_article_body(doc: &Html) -> String {
    for css in ARTICLE_SELECTORS {
        let Some(container) = select_all(doc, css).into_iter().next() else {
            continue;
        };
        let text = text_excluding(&container, &STRIP);
        if text.chars().count() > MIN_ARTICLE_LEN {
            tracing::debug!(selector = css, len = text.len(), "article body found");
            return smart_truncate(&text, MAX_ARTICLE_LEN);
        }
    }
    String::new()
}

/// Cuts `text` to at most `max` characters.
///
/// Prefers the last `.`, `!` or `?` past [`SENTENCE_WINDOW`] of the window (kept),
/// then the last space past [`WORD_WINDOW`], then a hard cut. Cuts that do not end
/// on a sentence get `...` appended, and the result never exceeds `max`.
pub fn smart_truncate(text: &str, max: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return text.to_string();
    }
    let window = &chars[..max];

    let sentence_floor = (max as f64 * SENTENCE_WINDOW) as usize;
    if let Some(i) = window.iter().rposition(|c| matches!(c, '.' | '!' | '?')) {
        if i > sentence_floor {
            return window[..=i].iter().collect();
        }
    }

    // The ellipsis counts toward `max`.
    let budget = max.saturating_sub(ELLIPSIS.len());
    let word_floor = (max as f64 * WORD_WINDOW) as usize;
    let cut = match window[..budget].iter().rposition(|c| *c == ' ') {
        Some(i) if i > word_floor => i,
        _ => budget,
    };
    let mut out: String = window[..cut].iter().collect();
    out.push_str(ELLIPSIS);
    out
}
