// src/crawl/fetch.rs
// =============================================================================
// Fetching one URL and classifying the response.
//
// Key functionality:
// - Makes a single GET request with redirects DISABLED (we want to see the
//   3xx ourselves, the target gets its own turn in the frontier)
// - Sorts the response into one of: success, redirect, not found
// - Fingerprints successful bodies with SHA-256 so any change is detected
// - Reads the Last-Modified header when the server sends one
//
// The HTTP client sits behind the `Fetch` trait. The real implementation is
// HttpFetcher (reqwest); tests plug in an in-memory site instead.
//
// HTTP status codes:
// - 300-399: Redirect (Location header holds the target)
// - 404: Not found, recorded but not parsed
// - everything else: treated as a success and parsed for links
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::{HeaderName, LAST_MODIFIED, LOCATION};
use reqwest::{redirect, Client, StatusCode};
use sha2::{Digest, Sha256};
use url::Url;

use super::normalize::{is_crawlable, normalize};
use super::record::PageRecord;
use crate::config::CrawlConfig;
use crate::error::{ConfigError, FetchError};

/// The parts of an HTTP response the crawler cares about.
#[derive(Debug, Clone, Default)]
pub struct FetchedResponse {
    pub status: u16,
    /// Raw Location header, if any
    pub location: Option<String>,
    /// Raw Last-Modified header, if any
    pub last_modified: Option<String>,
    pub body: Vec<u8>,
}

/// Something that can GET a URL without following redirects.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// reqwest-backed fetcher used for real crawls.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, ConfigError> {
        // One client per crawl; reqwest pools connections behind it
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        let location = header(LOCATION);
        let last_modified = header(LAST_MODIFIED);

        // Redirect and 404 bodies are never looked at
        let body = if status.is_redirection() || status == StatusCode::NOT_FOUND {
            Vec::new()
        } else {
            response.bytes().await?.to_vec()
        };

        Ok(FetchedResponse {
            status: status.as_u16(),
            location,
            last_modified,
            body,
        })
    }
}

/// Outcome of classifying one response.
#[derive(Debug)]
pub struct Classified {
    pub record: PageRecord,
    /// The body to parse for links, only present for successes
    pub body: Option<Vec<u8>>,
}

/// Turns a response for `loc` into a PageRecord.
///
/// `page_url` is the parsed form of `loc`; redirect targets are resolved
/// against it.
pub fn classify(loc: &str, page_url: &Url, response: FetchedResponse) -> Classified {
    let status = response.status;

    if status == 404 {
        return Classified {
            record: PageRecord::not_found(loc.to_string()),
            body: None,
        };
    }

    if (300..=399).contains(&status) {
        let target = response
            .location
            .as_deref()
            .filter(|location| !location.trim().is_empty())
            .and_then(|location| normalize(page_url, location))
            // mailto:, javascript: and friends can't be listed in a sitemap
            .filter(|target| is_crawlable(target));
        return Classified {
            record: PageRecord::redirect(loc.to_string(), status, target),
            body: None,
        };
    }

    let hash = content_hash(&response.body);
    let server_last_modified = response.last_modified.as_deref().and_then(parse_http_date);
    Classified {
        record: PageRecord::success(loc.to_string(), status, hash, server_last_modified),
        body: Some(response.body),
    }
}

/// Hex-encoded SHA-256 of the exact response bytes.
pub fn content_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Parses an HTTP date (RFC 1123, RFC 850 or asctime form) into UTC.
/// Anything unparseable is treated as absent.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    const OBSOLETE_FORMATS: [&str; 2] = [
        "%A, %d-%b-%y %H:%M:%S GMT", // RFC 850
        "%a %b %e %H:%M:%S %Y",      // asctime
    ];
    OBSOLETE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
