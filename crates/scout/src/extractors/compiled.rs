// ABOUTME: Pre-compiled CSS selector cache for O(1) selector lookup.
// ABOUTME: Selector lists from descriptors and heuristics are parsed once and reused for every page.

//! Selector caching for efficient repeated DOM queries.
//!
//! Every extraction run walks the same selector lists (generic title chains,
//! site descriptors, workout containers). Parsing those strings is more
//! expensive than matching them, so parsed selectors are cached process-wide.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use scraper::Selector;

/// Thread-safe cache of parsed CSS selectors. Invalid selectors are cached as `None`.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Arc<Selector>>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or parses a CSS selector, caching the result.
///
/// Returns `None` if the selector string is not valid CSS.
pub fn get_or_compile(css: &str) -> Option<Arc<Selector>> {
    {
        let cache = SELECTOR_CACHE.read().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok().map(Arc::new);
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    // Another thread may have inserted while we were parsing.
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Precompiles a batch of selectors into the cache.
///
/// Called after loading the extractor registry so descriptor selectors are
/// parsed once up front.
pub fn precompile_selectors<I, S>(selectors: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cache = SELECTOR_CACHE.write().unwrap_or_else(|e| e.into_inner());
    for css in selectors {
        let css = css.as_ref();
        if !cache.contains_key(css) {
            let compiled = Selector::parse(css).ok().map(Arc::new);
            cache.insert(css.to_string(), compiled);
        }
    }
}
