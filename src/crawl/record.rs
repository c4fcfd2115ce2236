// src/crawl/record.rs
// =============================================================================
// What one crawl produces.
//
// A PageRecord describes the outcome of fetching one URL. The outcome is an
// enum, so a record can never be "a redirect AND a success" at the same time:
//   Success  -> carries the content hash (and maybe a Last-Modified date)
//   Redirect -> carries the normalized target (None if Location was missing)
//   NotFound -> carries nothing
// URLs whose fetch failed outright produce no record at all.
//
// A CrawlResult gathers every record of one run plus the image and video URLs
// discovered along the way.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageOutcome {
    Success {
        content_hash: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        server_last_modified: Option<DateTime<Utc>>,
    },
    Redirect {
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// The normalized URL that was requested
    pub loc: String,
    /// Raw HTTP status code
    pub status: u16,
    #[serde(flatten)]
    pub outcome: PageOutcome,
}

impl PageRecord {
    pub fn success(
        loc: String,
        status: u16,
        content_hash: String,
        server_last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            loc,
            status,
            outcome: PageOutcome::Success {
                content_hash,
                server_last_modified,
            },
        }
    }

    pub fn redirect(loc: String, status: u16, target: Option<String>) -> Self {
        Self {
            loc,
            status,
            outcome: PageOutcome::Redirect { target },
        }
    }

    pub fn not_found(loc: String) -> Self {
        Self {
            loc,
            status: 404,
            outcome: PageOutcome::NotFound,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, PageOutcome::Success { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.outcome, PageOutcome::Redirect { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.outcome, PageOutcome::NotFound)
    }

    pub fn redirect_to(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Redirect { target } => target.as_deref(),
            _ => None,
        }
    }

    pub fn content_hash(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Success { content_hash, .. } => Some(content_hash),
            _ => None,
        }
    }

    pub fn server_last_modified(&self) -> Option<DateTime<Utc>> {
        match &self.outcome {
            PageOutcome::Success {
                server_last_modified,
                ..
            } => *server_last_modified,
            _ => None,
        }
    }

    /// The URL this record stands for in a sitemap: the page itself for a
    /// success, the target for a redirect, nothing otherwise.
    pub fn resolved_url(&self) -> Option<&str> {
        match &self.outcome {
            PageOutcome::Success { .. } => Some(&self.loc),
            PageOutcome::Redirect { target } => target.as_deref(),
            PageOutcome::NotFound => None,
        }
    }
}

/// Everything one crawl found. Image and video sets iterate in sorted order
/// so generated files are reproducible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    pub pages: Vec<PageRecord>,
    pub images: BTreeSet<String>,
    pub videos: BTreeSet<String>,
}

impl CrawlResult {
    pub fn not_found_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_not_found()).count()
    }

    pub fn redirect_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_redirect()).count()
    }
}
