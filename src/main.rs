//! Kumo main entry point
//!
//! Command-line interface: load a TOML config, run the crawl, and stop
//! cleanly on Ctrl-C.

use anyhow::Context;
use clap::Parser;
use kumo::config::load_config;
use kumo::crawler::Controller;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kumo: a polite page-harvesting web crawler
///
/// Kumo crawls the hosts of its seed URLs, respecting robots.txt and
/// per-host rate limits, and appends every fetched page to a single
/// output file.
#[derive(Parser, Debug)]
#[command(name = "kumo")]
#[command(version = "1.0.0")]
#[command(about = "A polite page-harvesting web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let controller = Controller::new(config).context("failed to initialize crawler")?;

    // Ctrl-C requests a cooperative stop; the monitor notices on its next
    // tick and runs the normal shutdown sequence.
    let state = controller.state();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping crawl");
            state.request_stop();
        }
    });

    let summary = controller.run().await;
    tracing::info!(
        "done: {} pages stored, {} URLs seen",
        summary.pages_stored,
        summary.urls_seen
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kumo=info,warn"),
            1 => EnvFilter::new("kumo=debug,info"),
            2 => EnvFilter::new("kumo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
