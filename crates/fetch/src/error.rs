// ABOUTME: Error types for talking to the video-listing API: ErrorCode enum and FetchError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Network,
    Timeout,
    Upstream,
    Parse,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Network => "network error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Upstream => "upstream error",
            ErrorCode::Parse => "malformed response",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for fetch operations.
#[derive(Debug, thiserror::Error)]
pub struct FetchError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    /// HTTP status for `Upstream` errors.
    pub status: Option<u16>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "holofeed: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl FetchError {
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
            status: None,
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

    /// Create a Network error.
    pub fn network(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Network, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create an Upstream error for a non-success HTTP status.
    pub fn upstream(url: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorCode::Upstream, url, op, None)
        }
    }

    /// Create a Parse error.
    pub fn parse(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Parse, url, op, source)
    }

    /// Classifies a reqwest transport error as Timeout or Network.
    pub fn from_transport(url: impl Into<String>, op: impl Into<String>, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(url, op, Some(anyhow::Error::new(err)))
        } else {
            Self::network(url, op, Some(anyhow::Error::new(err)))
        }
    }

    /// Returns true for failures that only cost one topic in a multi-topic run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Network | ErrorCode::Timeout | ErrorCode::Upstream
        )
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::Network
    }

    pub fn is_upstream(&self) -> bool {
        self.code == ErrorCode::Upstream
    }

    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }
}
