// src/sitemap/mod.rs
// =============================================================================
// Sitemap generation: chunking URL lists and writing the XML files.
// =============================================================================

mod chunk;
mod writer;

pub use chunk::{chunk, MAX_URLS_PER_SITEMAP};
pub use writer::{
    generate_all, sitemap_file_name, write_sitemaps, write_sitemaps_chunked,
    GeneratedSitemaps, SitemapEntry, SitemapKind,
};
