// ABOUTME: Extraction strategies: generic fields, recipe JSON-LD, workout sections, and data-driven site extractors.
// ABOUTME: Every strategy returns (key, value, provenance) fields; merging happens in the client.

//! Extraction strategies.
//!
//! Submodules:
//! - `generic`: title and description selector lists for any page.
//! - `recipe`: schema.org Recipe JSON-LD with a markup fallback.
//! - `workout`: workout tables, containers, and lists, plus fitness fields.
//! - `text_scan`: raw-text exercise mentions.
//! - `patterns`: named heuristic predicates shared by the workout code.
//! - `custom`: site extractor descriptors and the registry.
//! - `loader`: the built-in registry from embedded JSON.
//! - `select`: the selector-list interpreter.
//! - `compiled`: the parsed selector cache.

pub mod compiled;
pub mod custom;
pub mod generic;
pub mod loader;
pub mod patterns;
pub mod recipe;
pub mod select;
pub mod text_scan;
pub mod workout;
