// ABOUTME: Configuration options for the scout client, and ClientBuilder for constructing it.
// ABOUTME: ClientBuilder provides a fluent API over proxies, timeouts, headers, and the extractor registry.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Client;
use crate::extractors::custom::ExtractorRegistry;
use crate::resource::{
    default_proxies, FetchOptions, ProxySpec, DEFAULT_ACCEPT, DEFAULT_MIN_BODY_LEN,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};

/// Configuration options for the scout client.
#[derive(Debug, Clone)]
pub struct Options {
    /// Timeout for each proxy candidate.
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    /// Proxy candidates in the order they are tried.
    pub proxies: Vec<ProxySpec>,
    pub min_body_len: usize,
    pub allow_private_networks: bool,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
    pub registry: Option<ExtractorRegistry>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            proxies: default_proxies(),
            min_body_len: DEFAULT_MIN_BODY_LEN,
            allow_private_networks: false,
            http_client: None,
            headers: HashMap::new(),
            registry: None,
        }
    }
}

impl Options {
    /// Fetch settings derived from these options.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            headers: self.headers.clone(),
            user_agent: self.user_agent.clone(),
            accept: self.accept.clone(),
            timeout: self.timeout,
            min_body_len: self.min_body_len,
            allow_private_networks: self.allow_private_networks,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the per-proxy timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the Accept header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.opts.accept = accept.into();
        self
    }

    /// Replace the proxy list.
    pub fn proxies(mut self, proxies: Vec<ProxySpec>) -> Self {
        self.opts.proxies = proxies;
        self
    }

    /// Append a proxy after the current ones.
    pub fn proxy(mut self, proxy: ProxySpec) -> Self {
        self.opts.proxies.push(proxy);
        self
    }

    /// Bodies of this many characters or fewer are rejected.
    pub fn min_body_len(mut self, len: usize) -> Self {
        self.opts.min_body_len = len;
        self
    }

    /// Allow or disallow local and private-network targets.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set a custom extractor registry.
    pub fn registry(mut self, reg: ExtractorRegistry) -> Self {
        self.opts.registry = Some(reg);
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
