// src/error.rs
// =============================================================================
// Typed errors for the library side of the crate.
//
// The binary (main.rs) works with anyhow::Result like before, but the engine
// returns concrete error enums so callers can tell a bad config apart from a
// failed file write.
//
// None of these errors can abort a crawl: fetch errors are swallowed per URL
// (the page is simply left out of the result).
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Why a single fetch attempt produced no response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request exceeded the per-request timeout
    #[error("request timed out")]
    Timeout,
    /// DNS, refused connection, reset, TLS handshake...
    #[error("connection failed: {0}")]
    Connect(String),
    /// Headers arrived but the body could not be read
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Other(error.to_string())
        }
    }
}

/// Problems with the crawl configuration, caught before any request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("base URL must use http or https: {0}")]
    UnsupportedScheme(String),
    #[error("max_pages must be at least 1")]
    ZeroPageCap,
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write sitemap {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove stale sitemap {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can stop a scan after (or before) the crawl itself.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
}
