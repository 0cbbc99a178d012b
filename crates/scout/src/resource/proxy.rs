// ABOUTME: Proxy candidate descriptors: name, endpoint template, and response format.
// ABOUTME: Templates substitute {url} (target encoded as a URI component) or {raw_url} (verbatim target).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Characters escaped in a URI component: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How a proxy returns the fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyFormat {
    /// The body is the page itself.
    #[default]
    Raw,
    /// The body is JSON with the page in `contents` or `data`.
    Json,
}

/// One proxy candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySpec {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub format: ProxyFormat,
}

impl ProxySpec {
    pub fn new(name: impl Into<String>, template: impl Into<String>, format: ProxyFormat) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            format,
        }
    }

    /// Parses a `NAME=TEMPLATE` argument. A `json:` template prefix marks a JSON-wrapping proxy.
    pub fn parse_arg(arg: &str) -> Option<Self> {
        let (name, template) = arg.split_once('=')?;
        let name = name.trim();
        if name.is_empty() || template.is_empty() {
            return None;
        }
        let (template, format) = match template.strip_prefix("json:") {
            Some(rest) => (rest, ProxyFormat::Json),
            None => (template, ProxyFormat::Raw),
        };
        Some(Self::new(name, template, format))
    }

    /// Endpoint for fetching `target` through this proxy.
    pub fn endpoint(&self, target: &str) -> String {
        let encoded = utf8_percent_encode(target, COMPONENT).to_string();
        self.template
            .replace("{url}", &encoded)
            .replace("{raw_url}", target)
    }
}

/// The default candidates, in the order they are tried.
pub fn default_proxies() -> Vec<ProxySpec> {
    vec![
        ProxySpec::new("corsproxy.io", "https://corsproxy.io/?{url}", ProxyFormat::Raw),
        ProxySpec::new(
            "allorigins",
            "https://api.allorigins.win/get?url={url}",
            ProxyFormat::Json,
        ),
        ProxySpec::new(
            "codetabs",
            "https://api.codetabs.com/v1/proxy?quest={url}",
            ProxyFormat::Raw,
        ),
        ProxySpec::new(
            "thingproxy",
            "https://thingproxy.freeboard.io/fetch/{url}",
            ProxyFormat::Raw,
        ),
        ProxySpec::new("crossorigin", "https://crossorigin.me/{raw_url}", ProxyFormat::Raw),
        ProxySpec::new(
            "allorigins-raw",
            "https://api.allorigins.win/raw?url={url}",
            ProxyFormat::Raw,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_order() {
        let names: Vec<_> = default_proxies().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "corsproxy.io",
                "allorigins",
                "codetabs",
                "thingproxy",
                "crossorigin",
                "allorigins-raw"
            ]
        );
    }

    #[test]
    fn endpoint_encodes_target() {
        let p = ProxySpec::new("p", "https://proxy.test/get?url={url}", ProxyFormat::Json);
        assert_eq!(
            p.endpoint("https://example.com/a?b=c&d=e"),
            "https://proxy.test/get?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
        let raw = ProxySpec::new("r", "https://proxy.test/{raw_url}", ProxyFormat::Raw);
        assert_eq!(
            raw.endpoint("https://example.com/x"),
            "https://proxy.test/https://example.com/x"
        );
    }

    #[test]
    fn endpoint_encodes_spaces_as_percent_twenty() {
        let p = ProxySpec::new("p", "https://proxy.test/?{url}", ProxyFormat::Raw);
        assert_eq!(
            p.endpoint("https://example.com/search?q=leg day&tag=a+b"),
            "https://proxy.test/?https%3A%2F%2Fexample.com%2Fsearch%3Fq%3Dleg%20day%26tag%3Da%2Bb"
        );
        assert_eq!(
            p.endpoint("https://example.com/it's-(new)!~*"),
            "https://proxy.test/?https%3A%2F%2Fexample.com%2Fit's-(new)!~*"
        );
        assert_eq!(
            p.endpoint("https://example.com/café"),
            "https://proxy.test/?https%3A%2F%2Fexample.com%2Fcaf%C3%A9"
        );
    }

    #[test]
    fn parse_arg_formats() {
        let p = ProxySpec::parse_arg("mine=json:http://localhost:9/get?u={url}").unwrap();
        assert_eq!(p.name, "mine");
        assert_eq!(p.format, ProxyFormat::Json);
        assert_eq!(p.template, "http://localhost:9/get?u={url}");

        let p = ProxySpec::parse_arg("plain=http://localhost:9/{raw_url}").unwrap();
        assert_eq!(p.format, ProxyFormat::Raw);

        assert!(ProxySpec::parse_arg("no-template").is_none());
        assert!(ProxySpec::parse_arg("=http://x/{url}").is_none());
    }
}
