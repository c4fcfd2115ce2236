// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, to stderr)
// 3. Dispatch to the appropriate subcommand handler
// 4. Print the scan report(s)
// 5. Exit with proper code (0 = success, 1 = a scan failed, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod logging; // src/logging.rs - tracing subscriber setup

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use futures::stream::{self, StreamExt};

use sitemap_guardian::{
    run_scan, BatchConfig, CrawlConfig, Crawler, HostMatch, HttpFetcher, ScanReport, SiteConfig,
};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every scan succeeded
//   Ok(1) = at least one scan reported an error
//   Err   = bad arguments/config, nothing was scanned
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Scan {
            website_url,
            site_id,
            output,
            max_pages,
            delay_ms,
            timeout_secs,
            user_agent,
            strict_host,
            json,
        } => {
            let host_match = if strict_host { HostMatch::Exact } else { HostMatch::Loose };
            let config = CrawlConfig::new(&website_url)?
                .with_max_pages(max_pages)?
                .with_delay(Duration::from_millis(delay_ms))
                .with_timeout(Duration::from_secs(timeout_secs))
                .with_user_agent(user_agent)
                .with_host_match(host_match);
            let output = output.unwrap_or_else(|| PathBuf::from("data").join(format!("site_{}", site_id)));

            handle_scan(site_id, config, output, json).await
        }
        Commands::Batch { config, json } => handle_batch(&config, json).await,
    }
}

async fn handle_scan(site_id: u64, config: CrawlConfig, output: PathBuf, json: bool) -> Result<i32> {
    if !json {
        println!("🔍 Scanning website: {}", config.base_url);
        println!("📊 Max pages: {}", config.max_pages);
    }

    let fetcher = HttpFetcher::new(&config)?;
    let crawler = Crawler::new(config, fetcher);
    let report = run_scan(site_id, &crawler, &output).await;

    print_reports(std::slice::from_ref(&report), json)?;
    Ok(exit_code(std::slice::from_ref(&report)))
}

async fn handle_batch(path: &Path, json: bool) -> Result<i32> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read batch config {}", path.display()))?;
    let batch = BatchConfig::from_json(&raw)
        .with_context(|| format!("invalid batch config {}", path.display()))?;

    // Validate everything up front so a typo doesn't surface halfway through
    let mut jobs = Vec::new();
    for site in &batch.sites {
        let config = site
            .crawl_config()
            .with_context(|| format!("site {} ({})", site.id, site.url))?;
        jobs.push((site.clone(), config));
    }

    if !json {
        println!(
            "🔍 Scanning {} site(s), {} at a time",
            jobs.len(),
            batch.concurrency.max(1)
        );
    }

    // Each site gets its own crawler (frontier, visited set, client):
    // nothing is shared between the concurrent scans
    let output_root = batch.output_root.clone();
    let mut reports: Vec<ScanReport> = stream::iter(jobs)
        .map(|(site, config)| {
            let output_root = output_root.clone();
            async move { scan_site(&site, config, &output_root).await }
        })
        .buffer_unordered(batch.concurrency.max(1))
        .collect()
        .await;

    reports.sort_by_key(|r| r.site_id);
    print_reports(&reports, json)?;
    Ok(exit_code(&reports))
}

async fn scan_site(site: &SiteConfig, config: CrawlConfig, output_root: &Path) -> ScanReport {
    let output = site.output_dir(output_root);
    match HttpFetcher::new(&config) {
        Ok(fetcher) => run_scan(site.id, &Crawler::new(config, fetcher), &output).await,
        Err(e) => {
            tracing::error!(site_id = site.id, error = %e, "could not build HTTP client");
            ScanReport::failed(site.id, &site.url, &output, chrono::Utc::now(), e)
        }
    }
}

fn exit_code(reports: &[ScanReport]) -> i32 {
    if reports.iter().all(ScanReport::is_ok) {
        0
    } else {
        1
    }
}

// Prints the reports either as a summary or JSON
fn print_reports(reports: &[ScanReport], json: bool) -> Result<()> {
    if json {
        let json_output = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string_pretty(reports)?
        };
        println!("{}", json_output);
    } else {
        for report in reports {
            print_summary(report);
        }
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    println!();
    match &report.errors {
        None => println!("✅ Scan successful for {}", report.site_url),
        Some(error) => {
            println!("❌ Scan failed for {}", report.site_url);
            println!("   {}", error);
            return;
        }
    }

    println!("{:<10} {:>10} {:>10}", "", "FOUND", "INCLUDED");
    println!("{}", "=".repeat(32));
    println!("{:<10} {:>10} {:>10}", "Pages", report.pages_found, report.pages_included);
    println!("{:<10} {:>10} {:>10}", "Images", report.images_found, report.images_included);
    println!("{:<10} {:>10} {:>10}", "Videos", report.videos_found, report.videos_included);
    println!();
    println!("   🔀 Redirects: {}", report.redirects);
    println!("   ❌ Not found: {}", report.not_found);

    let files: Vec<&String> = report
        .pages_sitemaps
        .iter()
        .chain(&report.images_sitemaps)
        .chain(&report.videos_sitemaps)
        .collect();
    println!("📄 Sitemaps in {}:", report.output_dir.display());
    for file in files {
        println!("   {}", file);
    }
}
