// ABOUTME: Fetches target HTML through an ordered list of proxies, validating each response.
// ABOUTME: Handles target safety checks, per-candidate timeouts, JSON unwrapping, and charset decoding.

//! Proxy fetching.
//!
//! Candidates are tried sequentially; each gets the full timeout before the
//! next is attempted. The first body that passes [`validate_html`] wins.
//! Per-candidate failures are logged and never surfaced; when every candidate
//! fails the caller gets [`ExtractError::all_proxies_exhausted`].

pub mod proxy;

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use aho_corasick::AhoCorasick;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::error::ExtractError;

pub use proxy::{default_proxies, ProxyFormat, ProxySpec};

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;
/// Per-candidate timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bodies this short or shorter are rejected.
pub const DEFAULT_MIN_BODY_LEN: usize = 200;
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Markup that a real page contains at least one of.
const HTML_MARKERS: &[&str] = &["<html", "<head", "<body", "<meta", "<title"];

static MARKERS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(HTML_MARKERS)
        .expect("valid markers")
});

const METADATA_HOSTS: &[&str] = &[
    "metadata.google.internal",
    "metadata.azure.com",
    "169.254.169.254",
];

/// Options for fetching through proxies.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub user_agent: String,
    pub accept: String,
    pub timeout: Duration,
    pub min_body_len: usize,
    pub allow_private_networks: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            min_body_len: DEFAULT_MIN_BODY_LEN,
            allow_private_networks: false,
        }
    }
}

/// A validated page and the proxy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub html: String,
    pub proxy_used: String,
}

/// Check if an IP address is in a private/reserved range.
pub fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => {
            if ip.is_unspecified() {
                return true;
            }
            ["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16", "127.0.0.0/8", "169.254.0.0/16"]
                .iter()
                .filter_map(|net| net.parse::<Ipv4Net>().ok())
                .any(|net| net.contains(ip))
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() || ip.is_unspecified() {
                return true;
            }
            if let Some(v4) = ip.to_ipv4_mapped() {
                return is_private_ip(&IpAddr::V4(v4));
            }
            ["fc00::/7", "fe80::/10"]
                .iter()
                .filter_map(|net| net.parse::<Ipv6Net>().ok())
                .any(|net| net.contains(ip))
        }
    }
}

/// Rejects targets that are not http(s), or that name a local, private, or cloud metadata host.
///
/// Only literal hosts are checked; names are not resolved.
pub fn check_target(target: &str, allow_private_networks: bool) -> Result<url::Url, ExtractError> {
    let parsed = url::Url::parse(target).map_err(|e| {
        ExtractError::invalid_url(target, "check_target", Some(anyhow::anyhow!("{e}")))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ExtractError::invalid_url(
            target,
            "check_target",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }
    let Some(host) = parsed.host_str() else {
        return Err(ExtractError::invalid_url(
            target,
            "check_target",
            Some(anyhow::anyhow!("missing host")),
        ));
    };
    if allow_private_networks {
        return Ok(parsed);
    }

    let host = host.trim_start_matches('[').trim_end_matches(']').to_lowercase();
    let blocked = host == "localhost"
        || host.ends_with(".localhost")
        || host.ends_with(".local")
        || METADATA_HOSTS.contains(&host.as_str())
        || host.parse::<IpAddr>().map(|ip| is_private_ip(&ip)).unwrap_or(false);
    if blocked {
        return Err(ExtractError::blocked_target(
            target,
            "check_target",
            Some(anyhow::anyhow!("local or private host {host}")),
        ));
    }
    Ok(parsed)
}

/// True when `html` is longer than `min_len` characters and contains page markup.
pub fn validate_html(html: &str, min_len: usize) -> bool {
    html.chars().count() > min_len && MARKERS.is_match(html)
}

/// Extracts the page from a JSON-wrapping proxy body; falls back to the raw body when it is not JSON.
pub fn unwrap_json_body(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => ["contents", "data"]
            .iter()
            .filter_map(|k| value.get(*k).and_then(|v| v.as_str()))
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string(),
        Err(_) => body,
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

async fn request_body(
    client: &reqwest::Client,
    endpoint: &str,
    opts: &FetchOptions,
) -> Result<String, ExtractError> {
    let mut request = client
        .get(endpoint)
        .header(ACCEPT, &opts.accept)
        .header(USER_AGENT, &opts.user_agent);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request.send().await.map_err(|e| {
        ExtractError::proxy_unavailable(endpoint, "fetch", Some(anyhow::anyhow!("request failed: {e}")))
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::proxy_unavailable(
            endpoint,
            "fetch",
            Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
        ));
    }
    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ExtractError::proxy_unavailable(
                endpoint,
                "fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        ExtractError::proxy_unavailable(
            endpoint,
            "fetch",
            Some(anyhow::anyhow!("failed to read body: {e}")),
        )
    })?;
    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ExtractError::proxy_unavailable(
            endpoint,
            "fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }
    Ok(decode_body(&body, content_type.as_deref()))
}

/// Fetches `target` through one proxy, bounded by the timeout, and validates the page.
pub async fn fetch_candidate(
    client: &reqwest::Client,
    proxy: &ProxySpec,
    target: &str,
    opts: &FetchOptions,
) -> Result<String, ExtractError> {
    let endpoint = proxy.endpoint(target);
    let body = match tokio::time::timeout(opts.timeout, request_body(client, &endpoint, opts)).await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(ExtractError::timeout(
                &endpoint,
                "fetch",
                Some(anyhow::anyhow!("no response within {:?}", opts.timeout)),
            ))
        }
    };

    let html = match proxy.format {
        ProxyFormat::Json => unwrap_json_body(body),
        ProxyFormat::Raw => body,
    };
    if !validate_html(&html, opts.min_body_len) {
        return Err(ExtractError::proxy_unavailable(
            &endpoint,
            "validate",
            Some(anyhow::anyhow!("response is not an HTML page ({} chars)", html.len())),
        ));
    }
    Ok(html)
}

/// Tries each proxy in order and returns the first validated page.
pub async fn fetch_via_proxies(
    client: &reqwest::Client,
    target: &str,
    proxies: &[ProxySpec],
    opts: &FetchOptions,
) -> Result<FetchResult, ExtractError> {
    check_target(target, opts.allow_private_networks)?;

    for proxy in proxies {
        tracing::debug!(proxy = %proxy.name, target, "trying proxy");
        match fetch_candidate(client, proxy, target, opts).await {
            Ok(html) => {
                tracing::debug!(proxy = %proxy.name, len = html.len(), "proxy succeeded");
                return Ok(FetchResult {
                    html,
                    proxy_used: proxy.name.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(proxy = %proxy.name, error = %e, "proxy candidate failed");
            }
        }
    }

    tracing::warn!(target, tried = proxies.len(), "all proxies exhausted");
    Err(ExtractError::all_proxies_exhausted(target, "fetch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    const TARGET: &str = "https://example.com/article";

    fn page() -> String {
        format!(
            "<html><head><title>Test</title></head><body><p>{}</p></body></html>",
            "content ".repeat(40)
        )
    }

    fn test_client() -> reqwest::Client {
        reqwest::Client::builder().build().unwrap()
    }

    fn raw_proxy(server: &MockServer, name: &str, path: &str) -> ProxySpec {
        ProxySpec::new(name, format!("{}?url={{url}}", server.url(path)), ProxyFormat::Raw)
    }

    #[tokio::test]
    async fn first_valid_candidate_wins() {
        let server = MockServer::start();
        let broken = server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(502).body("bad gateway");
        });
        let tiny = server.mock(|when, then| {
            when.method(GET).path("/tiny");
            then.status(200).body("<html></html>");
        });
        let good = server.mock(|when, then| {
            when.method(GET)
                .path("/good")
                .query_param("url", TARGET)
                .header("accept", DEFAULT_ACCEPT)
                .header("user-agent", DEFAULT_USER_AGENT);
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(page());
        });

        let proxies = vec![
            raw_proxy(&server, "down", "/down"),
            raw_proxy(&server, "tiny", "/tiny"),
            raw_proxy(&server, "good", "/good"),
        ];
        let result = fetch_via_proxies(&test_client(), TARGET, &proxies, &FetchOptions::default())
            .await
            .unwrap();

        broken.assert();
        tiny.assert();
        good.assert();
        assert_eq!(result.proxy_used, "good");
        assert_eq!(result.html, page());
    }

    #[tokio::test]
    async fn json_wrapped_body_is_unwrapped() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "contents": page(), "status": { "http_code": 200 } }));
        });
        let proxies = vec![ProxySpec::new(
            "wrapped",
            format!("{}?url={{url}}", server.url("/get")),
            ProxyFormat::Json,
        )];
        let result = fetch_via_proxies(&test_client(), TARGET, &proxies, &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(result.html, page());
    }

    #[tokio::test]
    async fn json_proxy_returning_html_falls_back_to_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get");
            then.status(200).body(page());
        });
        let proxies = vec![ProxySpec::new(
            "wrapped",
            format!("{}?url={{url}}", server.url("/get")),
            ProxyFormat::Json,
        )];
        let result = fetch_via_proxies(&test_client(), TARGET, &proxies, &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(result.html, page());
    }

    #[tokio::test]
    async fn slow_candidate_times_out_and_next_is_tried() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(800)).body(page());
        });
        server.mock(|when, then| {
            when.method(GET).path("/fast");
            then.status(200).body(page());
        });
        let proxies = vec![raw_proxy(&server, "slow", "/slow"), raw_proxy(&server, "fast", "/fast")];
        let opts = FetchOptions {
            timeout: Duration::from_millis(100),
            ..Default::default()
        };

        let err = fetch_candidate(&test_client(), &proxies[0], TARGET, &opts)
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        let result = fetch_via_proxies(&test_client(), TARGET, &proxies, &opts)
            .await
            .unwrap();
        assert_eq!(result.proxy_used, "fast");
    }

    #[tokio::test]
    async fn every_candidate_failing_is_exhaustion() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/short");
            then.status(200).body("plain text response without any markup at all");
        });
        let proxies = vec![raw_proxy(&server, "short", "/short")];
        let err = fetch_via_proxies(&test_client(), TARGET, &proxies, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_exhausted());
    }

    #[tokio::test]
    async fn blocked_target_never_reaches_a_proxy() {
        let server = MockServer::start();
        let never = server.mock(|when, then| {
            when.method(GET).path("/p");
            then.status(200).body(page());
        });
        let proxies = vec![raw_proxy(&server, "p", "/p")];
        let err = fetch_via_proxies(
            &test_client(),
            "http://127.0.0.1:8080/admin",
            &proxies,
            &FetchOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(err.is_blocked_target());
        never.assert_calls(0);
    }

    #[test]
    fn target_checks() {
        assert!(check_target("https://example.com/x", false).is_ok());
        assert!(check_target("ftp://example.com/x", false).unwrap_err().is_invalid_url());
        assert!(check_target("not a url", false).unwrap_err().is_invalid_url());
        for blocked in [
            "http://localhost/",
            "http://printer.local/",
            "http://app.localhost:3000/",
            "http://10.1.2.3/",
            "http://0.0.0.0/",
            "http://[::1]/",
            "http://169.254.169.254/latest/meta-data",
            "http://metadata.google.internal/",
        ] {
            assert!(
                check_target(blocked, false).unwrap_err().is_blocked_target(),
                "{blocked}"
            );
        }
        assert!(check_target("http://localhost/", true).is_ok());
    }

    #[test]
    fn html_validation() {
        let filler = "x".repeat(250);
        assert!(validate_html(&format!("<HTML>{filler}"), 200));
        assert!(validate_html(&format!("<title>t</title>{filler}"), 200));
        assert!(!validate_html(&filler, 200));
        assert!(!validate_html("<html></html>", 200));
    }

    #[test]
    fn json_unwrapping() {
        assert_eq!(unwrap_json_body(r#"{"contents":"<html>a</html>"}"#.into()), "<html>a</html>");
        assert_eq!(unwrap_json_body(r#"{"contents":"","data":"<p>b</p>"}"#.into()), "<p>b</p>");
        assert_eq!(unwrap_json_body(r#"{"status":1}"#.into()), "");
        assert_eq!(unwrap_json_body("<html>raw</html>".into()), "<html>raw</html>");
    }

    #[test]
    fn test_decode_iso_8859_1_with_chardetng() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(iso_bytes, None), "café");
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.31.255.255".parse().unwrap()));
        assert!(is_private_ip(&"192.168.0.1".parse().unwrap()));
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.0.1".parse().unwrap()));
        assert!(is_private_ip(&"::ffff:10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"fd00::1".parse().unwrap()));
        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"172.32.0.1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(extract_charset("text/html; charset=ISO-8859-1"), Some("iso-8859-1".to_string()));
        assert_eq!(extract_charset("text/html; charset=\"utf-8\""), Some("utf-8".to_string()));
        assert_eq!(extract_charset("text/html"), None);
    }
}
