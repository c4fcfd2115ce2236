// src/lib.rs
// =============================================================================
// sitemap-guardian: incremental crawl-and-diff engine for sitemap generation.
//
// The pieces, leaf first:
// - crawl: URL normalization, frontier, fetch + classify, the crawl loop
// - diff: change detection against the previous crawl, history file
// - sitemap: 50,000-URL chunking and XML writing
// - scan: the whole pipeline for one site, producing a ScanReport
//
// The binary in main.rs is a thin CLI over `scan`.
// =============================================================================

pub mod config;
pub mod crawl;
pub mod diff;
pub mod error;
pub mod scan;
pub mod sitemap;

pub use config::{BatchConfig, CrawlConfig, HostMatch, SiteConfig};
pub use crawl::{CrawlResult, Crawler, Fetch, HttpFetcher, PageRecord};
pub use diff::{HistoricalPageEntry, History, HistoryStore, ResolvedPage};
pub use scan::{run_scan, ScanReport};
