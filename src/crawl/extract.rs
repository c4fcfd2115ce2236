// src/crawl/extract.rs
// =============================================================================
// This module pulls links and media references out of HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Never fails hard: broken markup just yields fewer elements
//
// What we collect:
// - <a href="...">            -> page links (candidates for the frontier)
// - <img src="...">           -> image URLs
// - <video src> / <source src> -> video URLs
//
// Every value is normalized against the page URL. Whether a page link is
// internal is decided by the crawler, not here.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

use super::normalize::{is_crawlable, normalize};

/// Links and assets found in one HTML document, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub links: Vec<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
}

/// Parses `html` and returns the normalized links, images and videos in it.
///
/// Links with a non-web scheme (mailto:, tel:, javascript:...) are dropped.
pub fn extract_page_links(html: &str, page_url: &Url) -> PageLinks {
    let document = Html::parse_document(html);

    PageLinks {
        links: collect(&document, "a[href]", "href", page_url)
            .into_iter()
            .filter(|link| is_crawlable(link))
            .collect(),
        images: collect(&document, "img[src]", "src", page_url),
        videos: collect(&document, "video[src], source[src]", "src", page_url),
    }
}

fn collect(document: &Html, selector: &str, attr: &str, page_url: &Url) -> Vec<String> {
    // Our selectors are constants, a parse failure would be a programming error
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .filter(|value| !value.trim().is_empty())
        .filter_map(|value| normalize(page_url, value))
        .collect()
}
