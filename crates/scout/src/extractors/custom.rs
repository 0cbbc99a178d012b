// ABOUTME: Site-specific extractor descriptors, the ordered registry, and the generic descriptor runner.
// ABOUTME: Each descriptor pairs a domain guard with (field key, selector list) rules instead of bespoke code.

//! Data-driven site extractors.
//!
//! A [`SiteExtractor`] activates only when the page domain contains one of its
//! hosts (and, optionally, when the URL matches `url_pattern`). Its rules are
//! evaluated by the shared selector interpreter in [`crate::extractors::select`].
//! Registration order is precedence order: see [`crate::client::Client::aggregate`].

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::extractors::select::{query_all, query_first_match};
use crate::result::{ExtractedField, FieldKey};

/// Specifies how to select a value from the DOM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// A CSS selector whose element text is used, e.g. "h1.headline"
    Css(String),
    /// A CSS selector with attribute extraction, e.g. ["meta[name='title']", "content"]
    CssAttr(Vec<String>),
}

impl Default for SelectorSpec {
    fn default() -> Self {
        SelectorSpec::Css(String::new())
    }
}

impl SelectorSpec {
    pub fn text(css: &str) -> Self {
        SelectorSpec::Css(css.to_string())
    }

    pub fn attr(css: &str, attr: &str) -> Self {
        SelectorSpec::CssAttr(vec![css.to_string(), attr.to_string()])
    }
}

/// One output field of a site extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    pub key: FieldKey,
    /// Selectors to try in order
    #[serde(default)]
    pub selectors: Vec<SelectorSpec>,
    /// Join every match of the winning selector with newlines instead of taking the first
    #[serde(default)]
    pub allow_multiple: bool,
    /// Maximum number of matches kept when `allow_multiple` is set
    #[serde(default)]
    pub limit: Option<usize>,
    /// Text prepended to the value
    #[serde(default)]
    pub prefix: Option<String>,
    /// Suffix removed from the value, e.g. " - YouTube"
    #[serde(default)]
    pub strip_suffix: Option<String>,
    /// The raw value must contain this text or the rule yields nothing
    #[serde(default)]
    pub require_contains: Option<String>,
}

impl FieldRule {
    fn finish(&self, raw: String) -> Option<String> {
        if let Some(ref needle) = self.require_contains {
            if !raw.contains(needle.as_str()) {
                return None;
            }
        }
        let mut value = match self.strip_suffix {
            Some(ref suffix) => raw.replacen(suffix.as_str(), "", 1),
            None => raw,
        };
        value = value.trim().to_string();
        if value.is_empty() {
            return None;
        }
        if let Some(ref prefix) = self.prefix {
            value = format!("{}{}", prefix, value);
        }
        Some(value)
    }
}

/// A complete site extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteExtractor {
    /// Short name used in provenance notes and logs
    pub name: String,
    /// Host fragments; the extractor is active when the page domain contains any of them
    pub domains: Vec<String>,
    /// Optional regex the full URL must match
    #[serde(default)]
    pub url_pattern: Option<String>,
    /// Field that receives capture group 1 of `url_pattern`
    #[serde(default)]
    pub url_capture: Option<FieldKey>,
    #[serde(default)]
    pub fields: Vec<FieldRule>,
    #[serde(skip)]
    compiled_pattern: Option<Regex>,
}

impl SiteExtractor {
    /// Compiles `url_pattern`. An invalid pattern disables the extractor.
    fn compile(&mut self) {
        if let Some(ref pattern) = self.url_pattern {
            match Regex::new(pattern) {
                Ok(re) => self.compiled_pattern = Some(re),
                Err(e) => {
                    tracing::warn!(extractor = %self.name, error = %e, "invalid url_pattern");
                    self.compiled_pattern = None;
                }
            }
        }
    }

    /// True when `domain` is in scope and the URL satisfies `url_pattern`.
    pub fn matches(&self, domain: &str, url: &str) -> bool {
        if !self.domains.iter().any(|d| domain.contains(d.as_str())) {
            return false;
        }
        match (&self.url_pattern, &self.compiled_pattern) {
            (None, _) => true,
            (Some(_), Some(re)) => re.is_match(url),
            (Some(_), None) => false,
        }
    }

    /// Runs every rule against the document. Returns nothing when out of scope.
    pub fn run(&self, doc: &Html, domain: &str, url: &str) -> Vec<ExtractedField> {
        if !self.matches(domain, url) {
            return Vec::new();
        }

        let mut fields = Vec::new();

        if let (Some(key), Some(re)) = (self.url_capture, &self.compiled_pattern) {
            if let Some(id) = re.captures(url).and_then(|c| c.get(1)) {
                fields.push(ExtractedField::new(
                    key,
                    id.as_str(),
                    format!("{}:url", self.name),
                ));
            }
        }

        for rule in &self.fields {
            let found = if rule.allow_multiple {
                query_all(doc, &rule.selectors, rule.limit)
                    .map(|(values, selector)| (values.join("\n"), selector))
            } else {
                query_first_match(doc, &rule.selectors).map(|m| (m.value, m.selector))
            };
            if let Some((raw, selector)) = found {
                if let Some(value) = rule.finish(raw) {
                    fields.push(ExtractedField::new(
                        rule.key,
                        value,
                        format!("{}:{}", self.name, selector),
                    ));
                }
            }
        }
        fields
    }

    /// Every CSS selector string referenced by this extractor.
    pub fn selectors(&self) -> impl Iterator<Item = String> + '_ {
        self.fields
            .iter()
            .flat_map(|r| r.selectors.iter().map(|s| parse_selector(s).0))
    }
}

/// Ordered collection of site extractors; order is precedence.
#[derive(Debug, Default, Clone)]
pub struct ExtractorRegistry {
    extractors: Vec<SiteExtractor>,
}

impl ExtractorRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extractor after every previously registered one.
    pub fn register(&mut self, mut extractor: SiteExtractor) {
        extractor.compile();
        self.extractors.push(extractor);
    }

    /// Looks up an extractor by name.
    pub fn get(&self, name: &str) -> Option<&SiteExtractor> {
        self.extractors.iter().find(|e| e.name == name)
    }

    /// Extractors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SiteExtractor> {
        self.extractors.iter()
    }

    /// Returns the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Returns true if no extractors are registered.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Runs every in-scope extractor in registration order.
    pub fn run_all(&self, doc: &Html, domain: &str, url: &str) -> Vec<ExtractedField> {
        self.extractors
            .iter()
            .flat_map(|e| e.run(doc, domain, url))
            .collect()
    }
}

/// Parses a selector spec into a CSS selector string and optional attribute name.
///
/// Returns (css_selector, optional_attribute).
pub fn parse_selector(selector: &SelectorSpec) -> (String, Option<String>) {
    match selector {
        SelectorSpec::Css(css) => (css.clone(), None),
        SelectorSpec::CssAttr(parts) => {
            if parts.len() >= 2 {
                (parts[0].clone(), Some(parts[1].clone()))
            } else if parts.len() == 1 {
                (parts[0].clone(), None)
            } else {
                (String::new(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule(key: FieldKey, selectors: Vec<SelectorSpec>) -> FieldRule {
        FieldRule {
            key,
            selectors,
            allow_multiple: false,
            limit: None,
            prefix: None,
            strip_suffix: None,
            require_contains: None,
        }
    }

    fn listing_extractor() -> SiteExtractor {
        let mut title = rule(FieldKey::Title, vec![SelectorSpec::text("h1.address")]);
        title.prefix = Some("Property: ".to_string());
        SiteExtractor {
            name: "listing".to_string(),
            domains: vec!["zillow".to_string()],
            fields: vec![title, rule(FieldKey::Price, vec![SelectorSpec::text(".price")])],
            ..Default::default()
        }
    }

    const LISTING_HTML: &str = r#"<html><body>
        <h1 class="address"> 12 Oak St </h1>
        <span class="price">$450,000</span>
    </body></html>"#;

    #[test]
    fn runs_rules_when_domain_matches() {
        let doc = Html::parse_document(LISTING_HTML);
        let ex = listing_extractor();
        let fields = ex.run(&doc, "www.zillow.com", "https://www.zillow.com/homedetails/1");
        assert_eq!(
            fields,
            vec![
                ExtractedField::new(FieldKey::Title, "Property: 12 Oak St", "listing:h1.address"),
                ExtractedField::new(FieldKey::Price, "$450,000", "listing:.price"),
            ]
        );
    }

    #[test]
    fn short_circuits_on_other_domains() {
        let doc = Html::parse_document(LISTING_HTML);
        let ex = listing_extractor();
        assert!(ex.run(&doc, "example.com", "https://example.com/").is_empty());
    }

    #[test]
    fn url_pattern_gates_and_captures() {
        let mut ex = SiteExtractor {
            name: "video".to_string(),
            domains: vec!["youtube.com".to_string()],
            url_pattern: Some(r"youtube\.com/watch\?v=([^&#?]+)".to_string()),
            url_capture: Some(FieldKey::VideoId),
            fields: vec![],
            ..Default::default()
        };
        ex.compile();
        let doc = Html::parse_document("<html></html>");
        assert!(ex
            .run(&doc, "www.youtube.com", "https://www.youtube.com/feed")
            .is_empty());
        let fields = ex.run(&doc, "www.youtube.com", "https://www.youtube.com/watch?v=abc123&t=1");
        assert_eq!(fields[0].key, FieldKey::VideoId);
        assert_eq!(fields[0].value, "abc123");
    }

    #[test]
    fn strip_suffix_and_require_contains() {
        let mut r = rule(FieldKey::Title, vec![SelectorSpec::text("title")]);
        r.strip_suffix = Some(" • Instagram".to_string());
        r.require_contains = Some("@".to_string());
        assert_eq!(
            r.finish("Jane (@jane) • Instagram".to_string()),
            Some("Jane (@jane)".to_string())
        );
        assert_eq!(r.finish("Instagram".to_string()), None);
    }

    #[test]
    fn allow_multiple_joins_with_newlines() {
        let html = r#"<ul id="f"><li>One</li><li>Two</li><li>Three</li></ul>"#;
        let doc = Html::parse_document(html);
        let mut r = rule(FieldKey::Features, vec![SelectorSpec::text("#f li")]);
        r.allow_multiple = true;
        r.limit = Some(2);
        let ex = SiteExtractor {
            name: "shop".to_string(),
            domains: vec!["amazon".to_string()],
            fields: vec![r],
            ..Default::default()
        };
        let fields = ex.run(&doc, "www.amazon.com", "https://www.amazon.com/dp/1");
        assert_eq!(fields[0].value, "One\nTwo");
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = ExtractorRegistry::new();
        assert!(registry.is_empty());
        registry.register(listing_extractor());
        registry.register(SiteExtractor {
            name: "second".to_string(),
            domains: vec!["zillow".to_string()],
            fields: vec![rule(FieldKey::Price, vec![SelectorSpec::text(".price")])],
            ..Default::default()
        });
        assert_eq!(registry.len(), 2);
        let names: Vec<_> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["listing", "second"]);
        assert!(registry.get("second").is_some());
        assert!(registry.get("missing").is_none());

        let doc = Html::parse_document(LISTING_HTML);
        let fields = registry.run_all(&doc, "zillow.com", "https://zillow.com/x");
        let sources: Vec<_> = fields.iter().map(|f| f.source.as_str()).collect();
        assert_eq!(
            sources,
            vec!["listing:h1.address", "listing:.price", "second:.price"]
        );
    }

    #[test]
    fn descriptor_deserializes_from_json() {
        let json = r##"{
            "name": "shop",
            "domains": ["amazon"],
            "fields": [
                {"key": "title", "selectors": ["#productTitle", ["meta[name='title']", "content"]]},
                {"key": "features", "selectors": ["#feature-bullets li"], "allow_multiple": true, "limit": 5}
            ]
        }"##;
        let ex: SiteExtractor = serde_json::from_str(json).unwrap();
        assert_eq!(ex.fields.len(), 2);
        assert_eq!(ex.fields[0].selectors[1], SelectorSpec::attr("meta[name='title']", "content"));
        assert_eq!(ex.fields[1].limit, Some(5));
        assert_eq!(ex.selectors().count(), 3);
    }

    #[test]
    fn parse_selector_variants() {
        assert_eq!(parse_selector(&SelectorSpec::text("h1")), ("h1".to_string(), None));
        assert_eq!(
            parse_selector(&SelectorSpec::attr("img", "src")),
            ("img".to_string(), Some("src".to_string()))
        );
        assert_eq!(
            parse_selector(&SelectorSpec::CssAttr(vec!["img".to_string()])),
            ("img".to_string(), None)
        );
        assert_eq!(parse_selector(&SelectorSpec::CssAttr(vec![])), (String::new(), None));
        assert_eq!(parse_selector(&SelectorSpec::default()), (String::new(), None));
    }
}
