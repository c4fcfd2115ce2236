// src/diff/history.rs
// =============================================================================
// The previous crawl's state, kept as a JSON file next to the sitemaps.
//
// The file is a plain array of HistoricalPageEntry. It is read before a scan
// and replaced as a whole after a successful one, so a crashed scan leaves
// the old history untouched (we write to a temp file and rename).
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::merge::{index_history, HistoricalPageEntry, History, ResolvedPage};
use crate::error::HistoryError;

pub const HISTORY_FILE_NAME: &str = "history.json";

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `{output_dir}/history.json`
    pub fn in_dir(output_dir: &Path) -> Self {
        Self::new(output_dir.join(HISTORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous crawl. A missing file means "first crawl ever" and
    /// yields an empty table.
    pub fn load(&self) -> Result<History, HistoryError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history yet");
                return Ok(History::new());
            }
            Err(source) => {
                return Err(HistoryError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let entries: Vec<HistoricalPageEntry> =
            serde_json::from_str(&json).map_err(|source| HistoryError::Json {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), entries = entries.len(), "history loaded");
        Ok(index_history(entries))
    }

    /// Replaces the stored history with this crawl's resolved pages.
    pub fn save(&self, pages: &[ResolvedPage]) -> Result<(), HistoryError> {
        let entries: Vec<HistoricalPageEntry> =
            pages.iter().map(ResolvedPage::to_history_entry).collect();
        let json = serde_json::to_string_pretty(&entries).map_err(|source| HistoryError::Json {
            path: self.path.clone(),
            source,
        })?;

        let io_error = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error)?;
        fs::rename(&tmp, &self.path).map_err(io_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::in_dir(&dir.path().join("site_1"));
        let when = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let pages = vec![
            ResolvedPage {
                url: "https://example.com".into(),
                status: 200,
                last_modified: when,
                content_hash: Some("abc".into()),
            },
            ResolvedPage {
                url: "https://example.com/new".into(),
                status: 301,
                last_modified: when,
                content_hash: None,
            },
        ];

        store.save(&pages).unwrap();
        let history = store.load().unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history["https://example.com"].content_hash.as_deref(), Some("abc"));
        assert_eq!(history["https://example.com/new"].last_modified, when);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(HistoryError::Json { .. })));
    }
}
