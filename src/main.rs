//! Listing-Harvester main entry point
//!
//! This is the command-line interface for the sampled property-listing crawler.

use anyhow::Context;
use clap::Parser;
use listing_harvester::config::{load_config_with_hash, Config};
use listing_harvester::crawler::{Coordinator, SampledPageIndex};
use listing_harvester::output::{
    field_coverage, format_elapsed, print_coverage, print_statistics, read_json_file,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Listing-Harvester: a sampled property-listing crawler
///
/// Listing-Harvester visits a reproducible random sample of listing index
/// pages, follows every property detail link on them, and writes one record
/// per property to a JSON file and a CSV file.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A sampled property-listing crawler", long_about = None)]
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

    /// Override the sampling seed from the config
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Override the number of index pages to sample
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Validate config and show which pages would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show field coverage of the existing JSON output and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, cli.seed, cli.pages)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, seed: Option<u64>, pages: Option<u32>) -> anyhow::Result<()> {
    if seed.is_none() && pages.is_none() {
        return Ok(());
    }

    if let Some(seed) = seed {
        tracing::info!("Seed overridden from command line: {}", seed);
        config.crawler.random_seed = seed;
    }
    if let Some(pages) = pages {
        tracing::info!("Sample size overridden from command line: {}", pages);
        config.crawler.pages_to_sample = pages;
    }

    listing_harvester::config::validate(config).context("Invalid command-line override")?;
    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let crawler = &config.crawler;
    let sample = SampledPageIndex::draw(
        crawler.max_index_pages,
        crawler.pages_to_sample,
        crawler.random_seed,
    )?;

    println!("=== Listing-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Index template: {}", crawler.base_url_template);
    println!("  Site origin: {}", crawler.resolved_origin()?);
    println!("  Detail prefix: {}", crawler.detail_path_prefix);
    println!("  Concurrency limit: {}", crawler.concurrency_limit);
    println!("  Inter-request delay: {}ms", crawler.inter_request_delay);
    println!("  Request timeout: {}s", crawler.request_timeout);
    println!("  Fetch retries: {}", crawler.fetch_retries);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  JSON: {}", config.output.json_path);
    println!("  CSV: {}", config.output.csv_path);

    println!(
        "\nSampled Index Pages ({} of {}, seed {}):",
        sample.len(),
        crawler.max_index_pages,
        sample.seed()
    );
    for page in sample.iter() {
        println!("  - {}", crawler.index_page_url(page));
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} index pages", sample.len());

    Ok(())
}

/// Handles the --stats mode: shows field coverage of the existing output
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.output.json_path);
    println!("Records: {}\n", path.display());

    let records = read_json_file(path)
        .with_context(|| format!("Failed to read records from {}", path.display()))?;
    print_coverage(&field_coverage(&records));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Sampling {} of {} index pages with up to {} concurrent workers",
        config.crawler.pages_to_sample,
        config.crawler.max_index_pages,
        config.crawler.concurrency_limit
    );

    let mut coordinator = Coordinator::new(config).context("Failed to start crawler")?;

    // Ctrl-C stops dispatch; whatever was gathered is still written
    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight workers");
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    let mut report = coordinator.run().await.context("Crawl failed")?;
    coordinator
        .write_outputs(&mut report)
        .context("Failed to write outputs")?;

    println!("Elapsed time: {}", format_elapsed(report.stats.elapsed));
    println!();
    print_statistics(&report.stats);
    println!();
    for path in &report.written {
        println!("Data saved to {}", path.display());
    }

    Ok(())
}
