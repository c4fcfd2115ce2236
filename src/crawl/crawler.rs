// src/crawl/crawler.rs
// =============================================================================
// This module implements website crawling with a breadth-first approach.
//
// How it works:
// 1. Start with the base URL in the frontier
// 2. Fetch the next URL (one at a time, never in parallel)
// 3. Classify the response and record it
// 4. For successes, extract links/images/videos; queue internal links
//    For redirects, queue the (internal) target
// 5. Sleep for the politeness delay
// 6. Repeat until the frontier is empty or the page cap is reached
//
// Failures never stop the crawl: a URL that can't be fetched is logged and
// left out of the result, and is not retried.
// =============================================================================

use std::time::Instant;

use tracing::{debug, info, warn};
use url::Url;

use super::extract::extract_page_links;
use super::fetch::{classify, Fetch};
use super::normalize::{is_crawlable, is_internal};
use super::queue::Frontier;
use super::record::CrawlResult;
use crate::config::CrawlConfig;

/// Crawls one site. Owns nothing mutable between runs: every call to
/// `crawl()` builds a fresh frontier and result.
pub struct Crawler<F> {
    config: CrawlConfig,
    fetcher: F,
}

impl<F: Fetch> Crawler<F> {
    pub fn new(config: CrawlConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Runs the crawl to completion and returns everything it found.
    pub async fn crawl(&self) -> CrawlResult {
        let started = Instant::now();
        let base = match Url::parse(&self.config.base_url) {
            Ok(url) => url,
            Err(e) => {
                // CrawlConfig::new already validated it
                warn!(url = %self.config.base_url, error = %e, "base URL does not parse");
                return CrawlResult::default();
            }
        };

        let mut frontier = Frontier::new(self.config.base_url.clone(), self.config.max_pages);
        let mut result = CrawlResult::default();
        let mut failures = 0usize;

        info!(site = %self.config.base_url, max_pages = self.config.max_pages, "crawl started");

        while let Some(loc) = frontier.dequeue_next() {
            debug!(url = %loc, processed = frontier.processed(), "crawling");

            match self.fetcher.fetch(&loc).await {
                Ok(response) => {
                    // `loc` came out of normalize(), so it parses; the fallback
                    // only keeps link resolution working if it somehow doesn't
                    let page_url = Url::parse(&loc).unwrap_or_else(|_| base.clone());
                    let classified = classify(&loc, &page_url, response);

                    if let Some(target) = classified.record.redirect_to() {
                        let followable = is_crawlable(target)
                            && is_internal(&base, target, self.config.host_match);
                        if followable {
                            frontier.enqueue_if_new(target.to_string());
                        }
                    }

                    if let Some(body) = classified.body {
                        let html = String::from_utf8_lossy(&body);
                        let found = extract_page_links(&html, &page_url);

                        for link in found.links {
                            if is_internal(&base, &link, self.config.host_match) {
                                frontier.enqueue_if_new(link);
                            }
                        }
                        result.images.extend(found.images);
                        result.videos.extend(found.videos);
                    }

                    debug!(url = %loc, status = classified.record.status, "classified");
                    result.pages.push(classified.record);
                }
                Err(e) => {
                    failures += 1;
                    warn!(url = %loc, error = %e, "fetch failed, skipping");
                }
            }

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        if frontier.cap_reached() && frontier.pending_len() > 0 {
            info!(
                cap = self.config.max_pages,
                pending = frontier.pending_len(),
                "page cap reached, stopping"
            );
        }

        info!(
            site = %self.config.base_url,
            pages = result.pages.len(),
            images = result.images.len(),
            videos = result.videos.len(),
            failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl finished"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::{FetchedResponse, HttpFetcher};
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// An in-memory website. URLs missing from the map fail like a dead host.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, FetchedResponse>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn html(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedResponse {
                    status: 200,
                    body: body.as_bytes().to_vec(),
                    ..Default::default()
                },
            );
            self
        }

        fn status(mut self, url: &str, status: u16, location: Option<&str>) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedResponse {
                    status,
                    location: location.map(|l| l.to_string()),
                    ..Default::default()
                },
            );
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for FakeSite {
        async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Connect("no such host".to_string()))
        }
    }

    /// Every page links to the next one, forever.
    struct EndlessSite;

    #[async_trait]
    impl Fetch for EndlessSite {
        async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
            let body = format!(r#"<a href="{}/next">next</a>"#, url);
            Ok(FetchedResponse {
                status: 200,
                body: body.into_bytes(),
                ..Default::default()
            })
        }
    }

    fn config(base: &str) -> CrawlConfig {
        CrawlConfig::new(base).unwrap().with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_cycle_visits_each_page_once() {
        let site = FakeSite::default()
            .html("https://example.com", r#"<a href="/b">B</a>"#)
            .html("https://example.com/b", r#"<a href="/">A</a><a href="/b/">B again</a>"#);
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        let locs: Vec<_> = result.pages.iter().map(|p| p.loc.as_str()).collect();
        assert_eq!(locs, vec!["https://example.com", "https://example.com/b"]);
        assert_eq!(
            crawler.fetcher.requests(),
            vec!["https://example.com", "https://example.com/b"]
        );
    }

    #[tokio::test]
    async fn test_redirect_target_gets_its_own_record() {
        let site = FakeSite::default()
            .html("https://example.com", r#"<a href="/old">old</a>"#)
            .status("https://example.com/old", 301, Some("/new"))
            .html("https://example.com/new", "<p>new home</p>");
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 3);
        let old = &result.pages[1];
        assert_eq!(old.loc, "https://example.com/old");
        assert_eq!(old.status, 301);
        assert_eq!(old.redirect_to(), Some("https://example.com/new"));

        let new = &result.pages[2];
        assert_eq!(new.loc, "https://example.com/new");
        assert!(new.is_success());
    }

    #[tokio::test]
    async fn test_external_redirect_not_followed() {
        let site = FakeSite::default()
            .status("https://example.com", 302, Some("https://other.org/landing"));
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.pages[0].redirect_to(), Some("https://other.org/landing"));
        assert_eq!(crawler.fetcher.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect_to_mailto_is_not_followed() {
        let site = FakeSite::default()
            .status("https://example.com", 302, Some("mailto:info@example.com"));
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(crawler.fetcher.requests(), vec!["https://example.com"]);
        assert_eq!(result.pages.len(), 1);
        assert!(result.pages[0].is_redirect());
        assert_eq!(result.pages[0].redirect_to(), None);
    }

    #[tokio::test]
    async fn test_not_found_is_recorded_but_not_parsed() {
        let site = FakeSite::default()
            .html("https://example.com", r#"<a href="/missing">?</a>"#)
            .status("https://example.com/missing", 404, None);
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 2);
        assert!(result.pages[1].is_not_found());
        assert_eq!(result.not_found_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_skipped() {
        let site = FakeSite::default().html(
            "https://example.com",
            r#"<a href="/dead">dead</a><a href="/alive">alive</a>"#,
        ).html("https://example.com/alive", "ok");
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        let locs: Vec<_> = result.pages.iter().map(|p| p.loc.as_str()).collect();
        assert_eq!(locs, vec!["https://example.com", "https://example.com/alive"]);
        // attempted once, never retried
        assert_eq!(
            crawler
                .fetcher
                .requests()
                .iter()
                .filter(|u| u.ends_with("/dead"))
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_after_every_url() {
        let delay = Duration::from_secs(1);
        let site = FakeSite::default()
            .html(
                "https://example.com",
                r#"<a href="/dead">dead</a><a href="/alive">alive</a>"#,
            )
            .html("https://example.com/alive", "ok");
        let crawler = Crawler::new(config("https://example.com").with_delay(delay), site);

        let started = tokio::time::Instant::now();
        let result = crawler.crawl().await;
        let elapsed = started.elapsed();

        // three URLs processed, one of them a failed fetch
        assert_eq!(crawler.fetcher.requests().len(), 3);
        assert_eq!(result.pages.len(), 2);
        assert!(elapsed >= delay * 3, "{:?}", elapsed);
        assert!(elapsed < delay * 4, "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_external_links_and_assets() {
        let site = FakeSite::default().html(
            "https://example.com",
            r#"
                <a href="https://rust-lang.org">external</a>
                <img src="/b.png"><img src="/a.png"><img src="/a.png#dup">
                <video><source src="/clip.mp4"></video>
            "#,
        );
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 1);
        assert_eq!(crawler.fetcher.requests(), vec!["https://example.com"]);
        let images: Vec<_> = result.images.iter().cloned().collect();
        assert_eq!(
            images,
            vec!["https://example.com/a.png", "https://example.com/b.png"]
        );
        assert!(result.videos.contains("https://example.com/clip.mp4"));
    }

    #[tokio::test]
    async fn test_page_cap_bounds_records() {
        let crawler = Crawler::new(
            config("https://example.com").with_max_pages(5).unwrap(),
            EndlessSite,
        );

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 5);
    }

    #[tokio::test]
    async fn test_every_record_has_exactly_one_outcome() {
        let site = FakeSite::default()
            .html(
                "https://example.com",
                r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a><a href="/d">d</a>"#,
            )
            .status("https://example.com/a", 301, Some("/"))
            .status("https://example.com/b", 404, None)
            .status("https://example.com/c", 307, None);
        let crawler = Crawler::new(config("https://example.com"), site);

        let result = crawler.crawl().await;

        assert_eq!(result.pages.len(), 4);
        for page in &result.pages {
            let outcomes = [
                page.redirect_to().is_some(),
                page.is_not_found(),
                page.content_hash().is_some(),
            ];
            assert!(outcomes.iter().filter(|o| **o).count() <= 1, "{:?}", page);
            // the only record with none of the three is a redirect lacking Location
            if outcomes.iter().all(|o| !o) {
                assert!(page.is_redirect());
            }
        }
    }

    #[tokio::test]
    async fn test_crawl_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="/old">old</a><a href="/about/">about</a><img src="/logo.png">"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/about"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/">home</a>"#))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&server.uri());
        let fetcher = HttpFetcher::new(&config).unwrap();
        let result = Crawler::new(config, fetcher).crawl().await;

        let base = server.uri();
        let summary: Vec<_> = result
            .pages
            .iter()
            .map(|p| (p.loc.clone(), p.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                (base.clone(), 200),
                (format!("{}/old", base), 301),
                (format!("{}/about", base), 200),
            ]
        );
        assert!(result.images.contains(&format!("{}/logo.png", base)));
    }
}
