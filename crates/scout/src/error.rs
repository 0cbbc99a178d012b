// ABOUTME: Error types for the scout extraction core including ErrorCode enum and ExtractError struct.
// ABOUTME: Errors stay inside the crate boundary; extract_metadata degrades every one of them to a fallback result.

use std::fmt;

/// Error codes representing the categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    BlockedTarget,
    ProxyUnavailable,
    Timeout,
    AllProxiesExhausted,
    MalformedJsonLd,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::BlockedTarget => "target blocked",
            ErrorCode::ProxyUnavailable => "proxy unavailable",
            ErrorCode::Timeout => "timeout",
            ErrorCode::AllProxiesExhausted => "all proxies exhausted",
            ErrorCode::MalformedJsonLd => "malformed JSON-LD",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every fallible step of the extraction pipeline.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scout: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a BlockedTarget error (local or private network target).
    pub fn blocked_target(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::BlockedTarget, url, op, source)
    }

    /// Create a ProxyUnavailable error for a single proxy candidate.
    pub fn proxy_unavailable(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ProxyUnavailable, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create an AllProxiesExhausted error.
    pub fn all_proxies_exhausted(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::AllProxiesExhausted, url, op, None)
    }

    /// Create a MalformedJsonLd error.
    pub fn malformed_json_ld(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::MalformedJsonLd, url, op, source)
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a BlockedTarget error.
    pub fn is_blocked_target(&self) -> bool {
        self.code == ErrorCode::BlockedTarget
    }

    /// Returns true if this is a ProxyUnavailable error.
    pub fn is_proxy_unavailable(&self) -> bool {
        self.code == ErrorCode::ProxyUnavailable
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if every proxy candidate failed.
    pub fn is_exhausted(&self) -> bool {
        self.code == ErrorCode::AllProxiesExhausted
    }

    /// Returns true if this is a MalformedJsonLd error.
    pub fn is_malformed_json_ld(&self) -> bool {
        self.code == ErrorCode::MalformedJsonLd
    }
}
