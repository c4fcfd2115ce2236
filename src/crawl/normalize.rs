// src/crawl/normalize.rs
// =============================================================================
// URL normalization and internal/external classification.
//
// Every URL that enters the frontier, the page records or the asset sets goes
// through normalize() first, so the same page is always spelled the same way:
//   "/about/"          -> "https://example.com/about"
//   "/about#team"      -> "https://example.com/about"
//   "https://example.com/" -> "https://example.com"
//
// is_internal() decides whether a link belongs to the site being crawled.
// In Loose mode the check is a substring test on the network location, so
// subdomains count as internal (and so does anything else whose host happens
// to contain ours). Exact mode is opt-in.
// =============================================================================

use url::Url;

use crate::config::HostMatch;

/// Resolves `link` against `base`, drops the fragment and trailing slashes.
///
/// Returns None when the link cannot be turned into an absolute URL.
/// Applying it twice gives the same result as applying it once.
pub fn normalize(base: &Url, link: &str) -> Option<String> {
    let mut resolved = base.join(link.trim()).ok()?;
    resolved.set_fragment(None);
    Some(resolved.as_str().trim_end_matches('/').to_string())
}

/// True when `url` has no network location (a relative form) or when its
/// network location matches the base site's according to `mode`.
pub fn is_internal(base: &Url, url: &str, mode: HostMatch) -> bool {
    let link_netloc = match Url::parse(url) {
        Ok(parsed) => netloc(&parsed),
        // Relative URLs have no network location at all
        Err(_) => return true,
    };
    if link_netloc.is_empty() {
        return true;
    }

    let base_netloc = netloc(base);
    match mode {
        HostMatch::Loose => link_netloc.contains(&base_netloc),
        HostMatch::Exact => link_netloc == base_netloc,
    }
}

/// Only web pages are worth fetching.
pub fn is_crawlable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

// host[:port], lowercase (Url already lowercases the host)
fn netloc(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
