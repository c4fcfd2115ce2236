// src/config.rs
// =============================================================================
// Crawl configuration.
//
// A CrawlConfig describes ONE crawl of ONE site: where to start, how many
// pages to visit at most, how long to wait between requests, and how strict
// the "is this link on our site?" check is.
//
// A BatchConfig is the JSON file read by `sitemap-guardian batch`, listing
// several sites to scan in one go.
//
// Rust concepts:
// - Default trait: sensible values when a field is not given
// - serde(default): lets JSON files omit optional fields
// - Builder-style methods (with_*) that consume and return self
// =============================================================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_MAX_PAGES: usize = 10_000;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("sitemap-guardian/", env!("CARGO_PKG_VERSION"));

/// How a link's host is compared against the site being crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostMatch {
    /// The site's host only has to appear somewhere inside the link's host,
    /// so `blog.example.com` counts as internal to `example.com`.
    #[default]
    Loose,
    /// Hosts (and ports) must be equal.
    Exact,
}

/// Settings for a single crawl.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Normalized start URL; also the base every link is resolved against
    pub base_url: String,
    pub max_pages: usize,
    /// Politeness delay applied after each processed URL
    pub delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
    pub user_agent: String,
    pub host_match: HostMatch,
}

impl CrawlConfig {
    /// Builds a config with default limits for `base_url`.
    ///
    /// The URL is validated here so the crawl itself never has to fail.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        let mut cleaned = parsed;
        cleaned.set_fragment(None);
        let base_url = cleaned.as_str().trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            max_pages: DEFAULT_MAX_PAGES,
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            host_match: HostMatch::default(),
        })
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Result<Self, ConfigError> {
        if max_pages == 0 {
            return Err(ConfigError::ZeroPageCap);
        }
        self.max_pages = max_pages;
        Ok(self)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_host_match(mut self, host_match: HostMatch) -> Self {
        self.host_match = host_match;
        self
    }
}

/// One entry of a batch file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub host_match: HostMatch,
}

impl SiteConfig {
    /// Turns the JSON entry into a validated CrawlConfig.
    pub fn crawl_config(&self) -> Result<CrawlConfig, ConfigError> {
        let mut config = CrawlConfig::new(&self.url)?.with_host_match(self.host_match);
        if let Some(max_pages) = self.max_pages {
            config = config.with_max_pages(max_pages)?;
        }
        if let Some(delay_ms) = self.delay_ms {
            config = config.with_delay(Duration::from_millis(delay_ms));
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(timeout_secs));
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        Ok(config)
    }

    /// Where this site's sitemaps and history live: `{root}/site_{id}`
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("site_{}", self.id))
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_concurrency() -> usize {
    4
}

/// Contents of the file passed to `sitemap-guardian batch`.
///
/// ```json
/// {
///   "output_root": "data",
///   "concurrency": 2,
///   "sites": [
///     { "id": 1, "url": "https://example.com" },
///     { "id": 2, "url": "https://blog.example.org", "max_pages": 500 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// How many sites are crawled at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    pub sites: Vec<SiteConfig>,
}

impl BatchConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
