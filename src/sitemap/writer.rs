// src/sitemap/writer.rs
// =============================================================================
// Writing sitemap XML files.
//
// One file per chunk, named `{prefix}_site{site_id}_{index}.xml` with the
// index starting at 1. Page sitemaps carry a <lastmod> per URL (UTC,
// ISO-8601); image and video sitemaps only list <loc>.
//
// Every file is written next to its final name and renamed into place, so a
// reader never sees a half-written sitemap. Files of the same category left
// over from a bigger previous run are removed afterwards.
//
// Output looks like:
//   <?xml version="1.0" encoding="UTF-8"?>
//   <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//     <url>
//       <loc>https://example.com/about</loc>
//       <lastmod>2024-06-01T12:00:00Z</lastmod>
//     </url>
//   </urlset>
// =============================================================================

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use super::chunk::{chunk, MAX_URLS_PER_SITEMAP};
use crate::diff::ResolvedPage;
use crate::error::SitemapError;

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Which flavor of sitemap a file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    Pages,
    Images,
    Videos,
}

impl SitemapKind {
    /// File name prefix used by generate_all()
    pub fn prefix(self) -> &'static str {
        match self {
            SitemapKind::Pages => "pages",
            SitemapKind::Images => "images",
            SitemapKind::Videos => "videos",
        }
    }

    fn writes_lastmod(self) -> bool {
        matches!(self, SitemapKind::Pages)
    }
}

/// One <url> element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
}

impl SitemapEntry {
    pub fn bare(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
        }
    }
}

impl From<&ResolvedPage> for SitemapEntry {
    fn from(page: &ResolvedPage) -> Self {
        Self {
            loc: page.url.clone(),
            lastmod: Some(page.last_modified),
        }
    }
}

/// `{prefix}_site{site_id}_{index}.xml`
pub fn sitemap_file_name(prefix: &str, site_id: u64, index: usize) -> String {
    format!("{}_site{}_{}.xml", prefix, site_id, index)
}

/// Writes `entries` as one or more sitemap files in `output_dir` and returns
/// the generated file names in order.
///
/// The directory is created when missing. An empty list writes nothing.
pub fn write_sitemaps(
    site_id: u64,
    output_dir: &Path,
    entries: &[SitemapEntry],
    kind: SitemapKind,
    prefix: &str,
) -> Result<Vec<String>, SitemapError> {
    write_sitemaps_chunked(site_id, output_dir, entries, kind, prefix, MAX_URLS_PER_SITEMAP)
}

/// Same as write_sitemaps() with a custom chunk size.
pub fn write_sitemaps_chunked(
    site_id: u64,
    output_dir: &Path,
    entries: &[SitemapEntry],
    kind: SitemapKind,
    prefix: &str,
    chunk_size: usize,
) -> Result<Vec<String>, SitemapError> {
    fs::create_dir_all(output_dir).map_err(|source| SitemapError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for (i, group) in chunk(entries, chunk_size).enumerate() {
        let name = sitemap_file_name(prefix, site_id, i + 1);
        let path = output_dir.join(&name);
        replace_file(&path, group, kind).map_err(|source| SitemapError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(file = %path.display(), urls = group.len(), "sitemap written");
        files.push(name);
    }

    remove_stale(site_id, output_dir, prefix, &files)?;
    Ok(files)
}

fn replace_file(path: &Path, entries: &[SitemapEntry], kind: SitemapKind) -> io::Result<()> {
    let tmp = path.with_extension("xml.tmp");
    let written = write_file(&tmp, entries, kind).and_then(|()| fs::rename(&tmp, path));
    if written.is_err() {
        // nothing useful left in it; the real error is the one we return
        let _ = fs::remove_file(&tmp);
    }
    written
}

// Deletes `{prefix}_site{site_id}_{n}.xml` files that are not in `keep`.
fn remove_stale(
    site_id: u64,
    output_dir: &Path,
    prefix: &str,
    keep: &[String],
) -> Result<(), SitemapError> {
    let remove_error = |path: &Path, source| SitemapError::Remove {
        path: path.to_path_buf(),
        source,
    };
    let stem = format!("{}_site{}_", prefix, site_id);

    for dir_entry in fs::read_dir(output_dir).map_err(|e| remove_error(output_dir, e))? {
        let dir_entry = dir_entry.map_err(|e| remove_error(output_dir, e))?;
        let file_name = dir_entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let is_ours = name
            .strip_prefix(&stem)
            .and_then(|rest| rest.strip_suffix(".xml"))
            .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()));
        if !is_ours || keep.iter().any(|kept| kept == name) {
            continue;
        }

        let path = dir_entry.path();
        fs::remove_file(&path).map_err(|e| remove_error(&path, e))?;
        debug!(file = %path.display(), "stale sitemap removed");
    }
    Ok(())
}

fn write_file(path: &Path, entries: &[SitemapEntry], kind: SitemapKind) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(writer, r#"<urlset xmlns="{}">"#, SITEMAP_NAMESPACE)?;
    for entry in entries {
        writeln!(writer, "  <url>")?;
        writeln!(writer, "    <loc>{}</loc>", escape_xml(&entry.loc))?;
        if kind.writes_lastmod() {
            if let Some(lastmod) = entry.lastmod {
                writeln!(
                    writer,
                    "    <lastmod>{}</lastmod>",
                    lastmod.to_rfc3339_opts(SecondsFormat::Secs, true)
                )?;
            }
        }
        writeln!(writer, "  </url>")?;
    }
    writeln!(writer, "</urlset>")?;
    writer.flush()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// File names produced for each category by generate_all().
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedSitemaps {
    pub pages: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Writes the page, image and video sitemaps of one site.
pub fn generate_all<'a>(
    site_id: u64,
    output_dir: &Path,
    pages: &[ResolvedPage],
    images: impl IntoIterator<Item = &'a String>,
    videos: impl IntoIterator<Item = &'a String>,
) -> Result<GeneratedSitemaps, SitemapError> {
    let page_entries: Vec<SitemapEntry> = pages.iter().map(SitemapEntry::from).collect();
    let image_entries: Vec<SitemapEntry> = images.into_iter().map(SitemapEntry::bare).collect();
    let video_entries: Vec<SitemapEntry> = videos.into_iter().map(SitemapEntry::bare).collect();

    let write = |entries: &[SitemapEntry], kind: SitemapKind| {
        write_sitemaps(site_id, output_dir, entries, kind, kind.prefix())
    };

    Ok(GeneratedSitemaps {
        pages: write(&page_entries, SitemapKind::Pages)?,
        images: write(&image_entries, SitemapKind::Images)?,
        videos: write(&video_entries, SitemapKind::Videos)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entries(n: usize) -> Vec<SitemapEntry> {
        (0..n)
            .map(|i| SitemapEntry {
                loc: format!("https://example.com/{}", i),
                lastmod: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            })
            .collect()
    }

    #[test]
    fn test_file_names_are_deterministic() {
        let dir = TempDir::new().unwrap();
        let files = write_sitemaps_chunked(
            3,
            dir.path(),
            &entries(5),
            SitemapKind::Pages,
            "pages",
            2,
        )
        .unwrap();
        assert_eq!(
            files,
            vec!["pages_site3_1.xml", "pages_site3_2.xml", "pages_site3_3.xml"]
        );
        for file in &files {
            assert!(dir.path().join(file).exists());
        }
    }

    #[test]
    fn test_page_sitemap_has_lastmod() {
        let dir = TempDir::new().unwrap();
        let files = write_sitemaps(1, dir.path(), &entries(2), SitemapKind::Pages, "pages").unwrap();
        assert_eq!(files, vec!["pages_site1_1.xml"]);

        let content = fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert!(content.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(content.contains(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#));
        assert!(content.contains("<loc>https://example.com/0</loc>"));
        assert!(content.contains("<lastmod>2024-06-01T12:00:00Z</lastmod>"));
        assert_eq!(content.matches("<url>").count(), 2);
        assert!(content.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_image_sitemap_is_bare() {
        let dir = TempDir::new().unwrap();
        let files = write_sitemaps(1, dir.path(), &entries(2), SitemapKind::Images, "images").unwrap();
        let content = fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert!(content.contains("<loc>https://example.com/1</loc>"));
        assert!(!content.contains("<lastmod>"));
    }

    #[test]
    fn test_urls_are_escaped() {
        let dir = TempDir::new().unwrap();
        let entry = SitemapEntry::bare("https://example.com/?a=1&b=<2>");
        let files = write_sitemaps(1, dir.path(), &[entry], SitemapKind::Videos, "videos").unwrap();
        let content = fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert!(content.contains("<loc>https://example.com/?a=1&amp;b=&lt;2&gt;</loc>"));
    }

    #[test]
    fn test_creates_missing_dir_and_tolerates_existing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("site_9");
        write_sitemaps(9, &nested, &entries(1), SitemapKind::Pages, "pages").unwrap();
        // second run into the now-existing directory
        let files = write_sitemaps(9, &nested, &entries(1), SitemapKind::Pages, "pages").unwrap();
        assert_eq!(files, vec!["pages_site9_1.xml"]);
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let files = write_sitemaps(1, dir.path(), &[], SitemapKind::Pages, "pages").unwrap();
        assert!(files.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    fn xml_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_shrinking_site_removes_leftover_chunks() {
        let dir = TempDir::new().unwrap();
        write_sitemaps_chunked(1, dir.path(), &entries(5), SitemapKind::Pages, "pages", 2).unwrap();
        // another site and another category in the same directory stay put
        write_sitemaps(12, dir.path(), &entries(1), SitemapKind::Pages, "pages").unwrap();
        write_sitemaps(1, dir.path(), &entries(1), SitemapKind::Images, "images").unwrap();

        let files =
            write_sitemaps_chunked(1, dir.path(), &entries(3), SitemapKind::Pages, "pages", 2).unwrap();

        assert_eq!(files, vec!["pages_site1_1.xml", "pages_site1_2.xml"]);
        assert_eq!(
            xml_files(dir.path()),
            vec![
                "images_site1_1.xml",
                "pages_site12_1.xml",
                "pages_site1_1.xml",
                "pages_site1_2.xml",
            ]
        );
    }

    #[test]
    fn test_category_dropping_to_zero_removes_its_files() {
        let dir = TempDir::new().unwrap();
        let pages: Vec<ResolvedPage> = Vec::new();
        let images = vec!["https://example.com/a.png".to_string()];
        let none: Vec<String> = Vec::new();

        generate_all(1, dir.path(), &pages, &images, &none).unwrap();
        assert_eq!(xml_files(dir.path()), vec!["images_site1_1.xml"]);

        let generated = generate_all(1, dir.path(), &pages, &none, &none).unwrap();
        assert!(generated.images.is_empty());
        assert!(xml_files(dir.path()).is_empty());
    }

    #[test]
    fn test_rewrite_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        write_sitemaps(1, dir.path(), &entries(2), SitemapKind::Pages, "pages").unwrap();
        write_sitemaps(1, dir.path(), &entries(3), SitemapKind::Pages, "pages").unwrap();

        assert_eq!(xml_files(dir.path()), vec!["pages_site1_1.xml"]);
        let content = fs::read_to_string(dir.path().join("pages_site1_1.xml")).unwrap();
        assert_eq!(content.matches("<url>").count(), 3);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        write_sitemaps(1, dir.path(), &entries(2), SitemapKind::Pages, "pages").unwrap();
        let before = fs::read_to_string(dir.path().join("pages_site1_1.xml")).unwrap();
        // a directory squatting on the temp name makes the write fail
        fs::create_dir(dir.path().join("pages_site1_1.xml.tmp")).unwrap();

        let result = write_sitemaps(1, dir.path(), &entries(3), SitemapKind::Pages, "pages");

        assert!(matches!(result, Err(SitemapError::Write { .. })));
        let after = fs::read_to_string(dir.path().join("pages_site1_1.xml")).unwrap();
        assert_eq!(after, before);
    }

    #[test]
    fn test_generate_all() {
        let dir = TempDir::new().unwrap();
        let pages = vec![ResolvedPage {
            url: "https://example.com".into(),
            status: 200,
            last_modified: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            content_hash: Some("h".into()),
        }];
        let images = vec!["https://example.com/a.png".to_string()];
        let videos: Vec<String> = Vec::new();

        let generated = generate_all(4, dir.path(), &pages, &images, &videos).unwrap();

        assert_eq!(generated.pages, vec!["pages_site4_1.xml"]);
        assert_eq!(generated.images, vec!["images_site4_1.xml"]);
        assert!(generated.videos.is_empty());
        let content = fs::read_to_string(dir.path().join("pages_site4_1.xml")).unwrap();
        assert!(content.contains("<lastmod>2024-01-01T00:00:00Z</lastmod>"));
    }
}
