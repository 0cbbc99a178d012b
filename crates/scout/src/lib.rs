// ABOUTME: Main library entry point for the scout URL metadata extractor.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, SiteMetadata, ExtractError, ProxySpec, Options.

//! Scout - structured metadata extraction for arbitrary URLs.
//!
//! Fetches a page through an ordered list of CORS-style proxies, then pulls a
//! title, description, article excerpt, key insights, recipe fields, workout
//! sections, and site-specific fields out of the markup. Extraction never
//! fails: when no proxy produces a page the result is built from the URL alone.
//!
//! # Example
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() {
//!     let meta = postplanner_scout::extract_metadata("https://example.com/article").await;
//!     println!("{}", meta.title);
//! }
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod fallback;
pub mod options;
pub mod resource;
pub mod result;

pub use crate::client::Client;
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::extractors::custom::{ExtractorRegistry, FieldRule, SelectorSpec, SiteExtractor};
pub use crate::extractors::loader::load_builtin_registry;
pub use crate::fallback::fallback_from_url;
pub use crate::options::{ClientBuilder, Options};
pub use crate::resource::{FetchResult, ProxyFormat, ProxySpec};
pub use crate::result::{ExtractedField, FieldKey, SiteMetadata};

/// Extracts metadata for `url` with a default client. Always resolves to a `SiteMetadata`.
pub async fn extract_metadata(url: &str) -> SiteMetadata {
    Client::builder().build().extract_metadata(url).await
}
