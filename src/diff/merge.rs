// src/diff/merge.rs
// =============================================================================
// Change detection: merge a fresh crawl with the previous one.
//
// For every page we must decide which <lastmod> date goes in the sitemap and
// which content hash is remembered for next time. The rules, in order:
//
// 1. The server sent Last-Modified  -> use it, keep the new hash
// 2. Never seen this URL before      -> stamp it with the crawl time
// 3. Seen before, hash changed       -> stamp it with the crawl time
// 4. Seen before, same hash (or no hash to compare, like a redirect)
//                                     -> keep the old date and old hash
//
// Rule 4 is what keeps search engines from seeing a fresh date on pages that
// didn't change.
//
// Pages are matched against history by their RESOLVED url: the page itself
// for a success, the target for a redirect.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::crawl::PageRecord;

/// What the previous crawl recorded for one resolved URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPageEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    /// Redirect entries carry no hash
    #[serde(default)]
    pub content_hash: Option<String>,
}

/// Lookup table from resolved URL to its previous entry.
pub type History = HashMap<String, HistoricalPageEntry>;

/// A page that made it into the sitemap, with its effective date and hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPage {
    pub url: String,
    pub status: u16,
    pub last_modified: DateTime<Utc>,
    pub content_hash: Option<String>,
}

impl ResolvedPage {
    /// The row the next crawl will compare against
    pub fn to_history_entry(&self) -> HistoricalPageEntry {
        HistoricalPageEntry {
            url: self.url.clone(),
            last_modified: self.last_modified,
            content_hash: self.content_hash.clone(),
        }
    }
}

/// Builds the lookup table from a list of entries. Later entries win.
pub fn index_history(entries: impl IntoIterator<Item = HistoricalPageEntry>) -> History {
    entries
        .into_iter()
        .map(|entry| (entry.url.clone(), entry))
        .collect()
}

/// Decides `(last_modified, content_hash)` for `record`.
///
/// Returns None for records that never go in a sitemap (404s, redirects
/// without a usable target).
pub fn decide(
    record: &PageRecord,
    history: &History,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, Option<String>)> {
    let key = record.resolved_url()?;
    let new_hash = record.content_hash().map(str::to_string);

    if let Some(server_date) = record.server_last_modified() {
        return Some((server_date, new_hash));
    }

    let Some(previous) = history.get(key) else {
        return Some((now, new_hash));
    };

    match &new_hash {
        Some(hash) if previous.content_hash.as_ref() != Some(hash) => Some((now, new_hash)),
        _ => Some((previous.last_modified, previous.content_hash.clone())),
    }
}

/// Applies `decide` to one record.
pub fn resolve(record: &PageRecord, history: &History, now: DateTime<Utc>) -> Option<ResolvedPage> {
    let url = record.resolved_url()?.to_string();
    let (last_modified, content_hash) = decide(record, history, now)?;
    Some(ResolvedPage {
        url,
        status: record.status,
        last_modified,
        content_hash,
    })
}

/// Resolves a whole crawl, in crawl order.
///
/// A redirect and its target resolve to the same URL, but a sitemap must
/// list each URL once. The URL keeps the position where it was first seen;
/// when a success record for it shows up, its decision replaces the one made
/// for the redirect, since only the success carries a fresh hash.
pub fn resolve_all(records: &[PageRecord], history: &History, now: DateTime<Utc>) -> Vec<ResolvedPage> {
    let mut resolved: Vec<ResolvedPage> = Vec::new();
    let mut positions: HashMap<String, (usize, bool)> = HashMap::new();

    for record in records {
        let Some(page) = resolve(record, history, now) else {
            continue;
        };
        match positions.get(&page.url).copied() {
            None => {
                positions.insert(page.url.clone(), (resolved.len(), record.is_success()));
                resolved.push(page);
            }
            Some((index, false)) if record.is_success() => {
                positions.insert(page.url.clone(), (index, true));
                resolved[index] = page;
            }
            Some(_) => {}
        }
    }

    resolved
}
