// ABOUTME: Loader for the built-in site extractor registry from embedded JSON descriptors.
// ABOUTME: Provides load_builtin_registry() to initialize the default ExtractorRegistry in precedence order.

//! Built-in site extractor registry.
//!
//! Descriptors live in `data/site_extractors.json`; file order is registration
//! order, which is also precedence order between site extractors.

use crate::extractors::compiled::precompile_selectors;
use crate::extractors::custom::{ExtractorRegistry, SiteExtractor};

/// Embedded JSON containing the built-in site extractors.
const BUILTIN_EXTRACTORS_JSON: &str = include_str!("../../data/site_extractors.json");

/// Parses a JSON array of descriptors into a registry, preserving order.
pub fn registry_from_json(json: &str) -> Result<ExtractorRegistry, serde_json::Error> {
    let extractors: Vec<SiteExtractor> = serde_json::from_str(json)?;
    let mut registry = ExtractorRegistry::new();
    for extractor in extractors {
        precompile_selectors(extractor.selectors());
        registry.register(extractor);
    }
    Ok(registry)
}

/// Loads the builtin extractor registry from embedded JSON.
///
/// A descriptor file that fails to parse yields an empty registry; generic
/// extraction still runs.
pub fn load_builtin_registry() -> ExtractorRegistry {
    registry_from_json(BUILTIN_EXTRACTORS_JSON).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to parse builtin site extractors");
        ExtractorRegistry::new()
    })
}
