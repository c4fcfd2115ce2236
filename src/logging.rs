// src/logging.rs
// =============================================================================
// Logging setup for the binary.
//
// The library only emits `tracing` events; whoever runs it decides where they
// go. Our CLI sends them to stderr so stdout stays clean for --json output.
//
// When RUST_LOG is set it replaces our defaults entirely, e.g.
// RUST_LOG=sitemap_guardian=trace. Otherwise -v picks between info and debug.
// =============================================================================

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_directives(level)),
    };

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn default_directives(level: &str) -> String {
    format!("warn,sitemap_guardian={}", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_follow_verbosity() {
        assert_eq!(default_directives("info"), "warn,sitemap_guardian=info");
        assert_eq!(default_directives("debug"), "warn,sitemap_guardian=debug");
        assert!(EnvFilter::try_new(default_directives("debug")).is_ok());
    }
}
