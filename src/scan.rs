// src/scan.rs
// =============================================================================
// One complete scan of one site.
//
// What happens here:
// 1. Load the previous crawl's history (empty on the first run)
// 2. Crawl the site
// 3. Merge every page with its history entry (change detection)
// 4. Write the page/image/video sitemaps
// 5. Save the merged pages as the new history
// 6. Summarize everything in a ScanReport
//
// Nothing is written until the crawl has finished, so a scan interrupted
// during the crawl leaves the previous sitemaps and history as they were.
// After that, each sitemap file is swapped in whole, and the history goes
// last: if a sitemap write fails the old history is kept and the next scan
// redoes the comparison against it.
// =============================================================================

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::crawl::{Crawler, Fetch};
use crate::diff::{resolve_all, HistoryStore};
use crate::error::ScanError;
use crate::sitemap::generate_all;

/// Outcome of one scan, suitable for printing or storing as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub site_id: u64,
    pub site_url: String,
    pub output_dir: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub pages_found: usize,
    pub images_found: usize,
    pub videos_found: usize,
    pub pages_included: usize,
    pub images_included: usize,
    pub videos_included: usize,
    pub redirects: usize,
    pub not_found: usize,
    pub pages_sitemaps: Vec<String>,
    pub images_sitemaps: Vec<String>,
    pub videos_sitemaps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

impl ScanReport {
    /// Report for a scan that produced nothing
    pub fn failed(
        site_id: u64,
        site_url: &str,
        output_dir: &Path,
        timestamp: DateTime<Utc>,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            site_id,
            site_url: site_url.to_string(),
            output_dir: output_dir.to_path_buf(),
            timestamp,
            pages_found: 0,
            images_found: 0,
            videos_found: 0,
            pages_included: 0,
            images_included: 0,
            videos_included: 0,
            redirects: 0,
            not_found: 0,
            pages_sitemaps: Vec::new(),
            images_sitemaps: Vec::new(),
            videos_sitemaps: Vec::new(),
            errors: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }
}

/// Runs a full scan and always returns a report; failures end up in
/// `report.errors`.
pub async fn run_scan<F: Fetch>(site_id: u64, crawler: &Crawler<F>, output_dir: &Path) -> ScanReport {
    let site_url = crawler.config().base_url.clone();
    let started_at = Utc::now();

    match try_scan(site_id, crawler, output_dir, started_at).await {
        Ok(report) => {
            info!(
                site_id,
                site = %site_url,
                pages = report.pages_included,
                images = report.images_included,
                videos = report.videos_included,
                "scan succeeded"
            );
            report
        }
        Err(e) => {
            error!(site_id, site = %site_url, error = %e, "scan failed");
            ScanReport::failed(site_id, &site_url, output_dir, started_at, e)
        }
    }
}

async fn try_scan<F: Fetch>(
    site_id: u64,
    crawler: &Crawler<F>,
    output_dir: &Path,
    crawl_time: DateTime<Utc>,
) -> Result<ScanReport, ScanError> {
    let store = HistoryStore::in_dir(output_dir);
    let history = store.load()?;

    let result = crawler.crawl().await;
    let resolved = resolve_all(&result.pages, &history, crawl_time);

    let generated = generate_all(site_id, output_dir, &resolved, &result.images, &result.videos)?;
    store.save(&resolved)?;

    Ok(ScanReport {
        site_id,
        site_url: crawler.config().base_url.clone(),
        output_dir: output_dir.to_path_buf(),
        timestamp: crawl_time,
        pages_found: result.pages.len(),
        images_found: result.images.len(),
        videos_found: result.videos.len(),
        pages_included: resolved.len(),
        images_included: result.images.len(),
        videos_included: result.videos.len(),
        redirects: result.redirect_count(),
        not_found: result.not_found_count(),
        pages_sitemaps: generated.pages,
        images_sitemaps: generated.images,
        videos_sitemaps: generated.videos,
        errors: None,
    })
}
