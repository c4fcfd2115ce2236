// src/sitemap/chunk.rs
// =============================================================================
// Splitting URL lists into sitemap-sized pieces.
//
// The sitemap protocol allows at most 50,000 URLs per file, so a big site
// gets pages_site1_1.xml, pages_site1_2.xml, ...
//
// chunk() is a thin wrapper over slice::chunks: lazy, in order, nothing
// dropped or repeated, and it can be restarted by simply calling it again
// (or cloning the iterator).
// =============================================================================

use std::slice::Chunks;

/// Protocol limit on URLs in a single sitemap file
pub const MAX_URLS_PER_SITEMAP: usize = 50_000;

/// Contiguous slices of `urls`, each at most `size` long.
///
/// A `size` of 0 is treated as 1.
pub fn chunk<T>(urls: &[T], size: usize) -> Chunks<'_, T> {
    urls.chunks(size.max(1))
}
