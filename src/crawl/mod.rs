// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling starting from the site's base URL
// - Stays on the site (internal links only, loose host matching by default)
// - Page cap so endless sites (calendars, faceted search) still terminate
// - Polite crawling: one request at a time with a delay in between
// - Records redirects and 404s instead of silently following or dropping them
//
// Submodules:
// - normalize: URL canonicalization + internal/external check
// - queue: the frontier (FIFO queue + visited set)
// - fetch: HTTP fetching and response classification
// - extract: link/image/video extraction from HTML
// - record: PageRecord / CrawlResult data types
// - crawler: the crawl loop tying it all together
// =============================================================================

mod crawler;
mod extract;
mod fetch;
mod normalize;
mod queue;
mod record;

pub use crawler::Crawler;
pub use extract::{extract_page_links, PageLinks};
pub use fetch::{classify, content_hash, parse_http_date, Classified, Fetch, FetchedResponse, HttpFetcher};
pub use normalize::{is_crawlable, is_internal, normalize};
pub use queue::Frontier;
pub use record::{CrawlResult, PageOutcome, PageRecord};
