// src/diff/mod.rs
// =============================================================================
// Incremental change detection between two crawls of the same site.
//
// - merge: the pure decision (which lastmod/hash to keep for a page)
// - history: loading/saving the previous crawl's decisions
// =============================================================================

mod history;
mod merge;

pub use history::{HistoryStore, HISTORY_FILE_NAME};
pub use merge::{decide, index_history, resolve, resolve_all, HistoricalPageEntry, History, ResolvedPage};
