// ABOUTME: The scout client: fetches a URL through proxies and aggregates every extractor into SiteMetadata.
// ABOUTME: Never fails; fetch problems degrade to URL-only metadata.

//! Metadata aggregation.
//!
//! Precedence, per key:
//! 1. Site-specific sources, in registration order: the recipe extractor, the
//!    fitness extractor, then registry descriptors in file order. The first
//!    source with a non-empty value owns the key.
//! 2. Generic extraction (title and description selector lists).
//! 3. Placeholders: [`UNTITLED`] for the title, the article excerpt for the description.

use std::collections::BTreeMap;

use scraper::Html;

use crate::dom::article::{extract_article_body, MAX_ARTICLE_LEN};
use crate::dom::insights::extract_key_insights;
use crate::dom::parse;
use crate::error::ExtractError;
use crate::extractors::custom::ExtractorRegistry;
use crate::extractors::generic::{generic_description, generic_title};
use crate::extractors::loader::load_builtin_registry;
use crate::extractors::recipe::extract_recipe;
use crate::extractors::workout::extract_workout_data;
use crate::fallback::fallback_from_url;
use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch_via_proxies, is_private_ip, FetchResult};
use crate::result::{ExtractedField, FieldKey, SiteMetadata, UNTITLED};

/// The scout client for extracting metadata from URLs.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
    registry: ExtractorRegistry,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts
            .http_client
            .clone()
            .unwrap_or_else(|| build_http_client(opts.allow_private_networks));
        let registry = opts.registry.clone().unwrap_or_else(load_builtin_registry);

        Self {
            opts,
            http_client,
            registry,
        }
    }

    /// The options this client was built with.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Fetches `url` through the configured proxies.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, ExtractError> {
        fetch_via_proxies(
            &self.http_client,
            url,
            &self.opts.proxies,
            &self.opts.fetch_options(),
        )
        .await
    }

    /// Fetches and extracts metadata for `url`. Always resolves to a `SiteMetadata`.
    pub async fn extract_metadata(&self, url: &str) -> SiteMetadata {
        match self.fetch(url).await {
            Ok(fetched) => self.aggregate(url, Some(&fetched)),
            Err(e) => {
                tracing::warn!(url, error = %e, "falling back to URL-only metadata");
                self.aggregate(url, None)
            }
        }
    }

    /// Builds metadata from a fetch result, or from the URL alone when there is none.
    pub fn aggregate(&self, url: &str, fetched: Option<&FetchResult>) -> SiteMetadata {
        match fetched {
            Some(fetched) => self.extract_from_html(&fetched.html, url, &fetched.proxy_used),
            None => fallback_from_url(url),
        }
    }

    /// Extracts metadata from already-fetched HTML.
    pub fn extract_from_html(&self, html: &str, url: &str, proxy_used: &str) -> SiteMetadata {
        let domain = url::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .unwrap_or_default();
        let doc = parse(html);
        self.extract_document(&doc, url, &domain, proxy_used)
    }

    fn extract_document(
        &self,
        doc: &Html,
        url: &str,
        domain: &str,
        proxy_used: &str,
    ) -> SiteMetadata {
        let title = generic_title(doc);
        let description = generic_description(doc);
        let article = extract_article_body(doc);
        let key_insights = extract_key_insights(&article);

        let workout = extract_workout_data(doc, url);
        let site_fields = extract_recipe(doc, url)
            .into_iter()
            .chain(workout.fields)
            .chain(self.registry.run_all(doc, domain, url));
        let site = first_per_key(site_fields);

        let article_len = article.chars().count();
        let mut meta = SiteMetadata {
            title: UNTITLED.to_string(),
            original_description: description.as_ref().map(|m| m.value.clone()),
            content_length: Some(article_len),
            has_rich_content: Some(article_len > MAX_ARTICLE_LEN),
            key_insights,
            exercise_mentions: workout.exercise_mentions,
            domain: domain.to_string(),
            used_proxy: proxy_used.to_string(),
            ..Default::default()
        };

        if let Some(m) = title {
            tracing::debug!(key = "title", source = %m.selector, "generic value");
            meta.set(FieldKey::Title, m.value);
        }
        match description {
            Some(m) => {
                tracing::debug!(key = "description", source = %m.selector, "generic value");
                meta.set(FieldKey::Description, m.value);
            }
            None => meta.set(FieldKey::Description, article.clone()),
        }
        if !article.is_empty() {
            meta.article_content = Some(article);
        }

        for field in site.into_values() {
            tracing::debug!(key = %field.key, source = %field.source, "site-specific value");
            meta.set(field.key, field.value);
        }
        meta
    }
}

/// Keeps the first non-empty value for each key, in iteration order.
fn first_per_key(fields: impl IntoIterator<Item = ExtractedField>) -> BTreeMap<FieldKey, ExtractedField> {
    let mut owned: BTreeMap<FieldKey, ExtractedField> = BTreeMap::new();
    for field in fields {
        if field.value.is_empty() {
            continue;
        }
        if let Some(existing) = owned.get(&field.key) {
            tracing::debug!(
                key = %field.key,
                kept = %existing.source,
                dropped = %field.source,
                "site-specific conflict"
            );
            continue;
        }
        owned.insert(field.key, field);
    }
    owned
}

fn build_http_client(allow_private_networks: bool) -> reqwest::Client {
    let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
        if !allow_private_networks {
            let blocked = attempt
                .url()
                .host_str()
                .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
                .and_then(|h| h.parse::<std::net::IpAddr>().ok())
                .map(|ip| is_private_ip(&ip))
                .unwrap_or(false);
            if blocked {
                return attempt.error("redirect to private IP blocked");
            }
        }
        if attempt.previous().len() >= 10 {
            return attempt.stop();
        }
        attempt.follow()
    });

    reqwest::Client::builder()
        .redirect(redirect_policy)
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build configured HTTP client, using defaults");
            reqwest::Client::new()
        })
}
