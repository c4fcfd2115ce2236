// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Two subcommands:
// - scan:  crawl one site and (re)generate its sitemaps
// - batch: scan every site listed in a JSON config file
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sitemap_guardian::config::{
    DEFAULT_DELAY_MS, DEFAULT_MAX_PAGES, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

#[derive(Parser, Debug)]
#[command(
    name = "sitemap-guardian",
    version,
    about = "Crawl a website and keep its sitemap XML files up to date",
    long_about = "sitemap-guardian crawls a website breadth-first, detects which pages changed since \
                  the previous crawl, and writes sitemap files for its pages, images and videos. \
                  Run it from cron (or any scheduler) to keep sitemaps fresh."
)]
pub struct Cli {
    /// Log debug details of the crawl to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one website and write its sitemaps
    ///
    /// Example: sitemap-guardian scan https://example.com --site-id 3
    Scan {
        /// Website URL to crawl (e.g., https://example.com)
        website_url: String,

        /// Numeric id used in sitemap file names (pages_site{ID}_1.xml)
        #[arg(long, default_value_t = 1)]
        site_id: u64,

        /// Where sitemaps and history.json go (default: data/site_{ID})
        #[arg(long)]
        output: Option<PathBuf>,

        /// Stop after this many URLs have been fetched
        #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
        max_pages: usize,

        /// Pause between two requests, in milliseconds
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        delay_ms: u64,

        /// Per-request timeout, in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// User-Agent header sent with every request
        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        user_agent: String,

        /// Only treat links on exactly the same host as internal
        /// (by default any host containing the site's host counts)
        #[arg(long)]
        strict_host: bool,

        /// Output the scan report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Scan every site listed in a JSON config file
    ///
    /// Example: sitemap-guardian batch sites.json
    Batch {
        /// Path to the batch config (see BatchConfig for the format)
        config: PathBuf,

        /// Output the scan reports as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}
