//! Seedlist main entry point
//!
//! This is the command-line interface for exporting and transforming
//! curated crawl-target data: URL lists, access lists, crawl feeds,
//! search annotations and static-site source pages.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seedlist::acl::build_access_list;
use seedlist::config::{load_config_with_hash, Config, FREQUENCIES};
use seedlist::data::{dataset_hash, load_dataset, Dataset, TargetFilter, Terms};
use seedlist::feeds::{generate_annotations, generate_crawl_feed};
use seedlist::site::generate_site;

/// Seedlist: curatorial target export toolkit
#[derive(Parser, Debug)]
#[command(name = "seedlist")]
#[command(version = "1.0.0")]
#[command(about = "Export and transform curated crawl-target data", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding the CSV export (overrides the config file)
    #[arg(short = 'd', long = "csv-dir")]
    csv_dir: Option<PathBuf>,

    /// Filter targets by crawl frequency (n.b. 'all' means all-but-nevercrawl)
    #[arg(short, long, value_parser = PossibleValuesParser::new(FREQUENCIES.iter().copied()))]
    frequency: Option<String>,

    /// Filter by the terms under which we may crawl
    #[arg(short, long, value_parser = PossibleValuesParser::new(["npld", "oa", "bypm", "all"]))]
    terms: Option<String>,

    /// Include targets marked as "hidden" by curators
    #[arg(long)]
    include_hidden: bool,

    /// Include targets even if the crawl end date has passed
    #[arg(long)]
    include_expired: bool,

    /// Omit URLs that are already in scope, because they have a UK TLD
    #[arg(long)]
    omit_uk_tlds: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List seed URLs from the selected Targets
    ListUrls,

    /// Load the CSV export and write it out as a single JSON document
    CsvToJson {
        /// File to write the JSON dataset to
        output_file: PathBuf,
    },

    /// Generate crawl-feed JSON for the selected Targets
    CrawlFeed {
        /// File to write the crawl feed to
        output_file: PathBuf,
    },

    /// Generate an access list from the open-access Target subset
    GenAcl {
        /// The file format to write: 'pywb' access rules, 'surts' canonical
        /// prefixes, or 'urls' for a plain sorted URL list
        #[arg(long, default_value = "pywb",
              value_parser = PossibleValuesParser::new(["pywb", "surts", "urls"]))]
        format: String,

        /// Leave out the static CDN allow-list entries
        #[arg(long)]
        omit_cdns: bool,

        /// File to write the access list to
        output_file: PathBuf,
    },

    /// Generate search annotations from the full Target set
    GenAnnotations {
        /// File to write the annotations JSON to
        output_file: PathBuf,
    },

    /// Generate static-site source files from the dataset
    GenSite {
        /// Directory to write site content into
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load config-file defaults, then let CLI options override them:
    let config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let csv_dir = cli
        .csv_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.dataset.csv_dir));
    let filter = build_filter(&cli, &config)?;

    tracing::info!("Loading dataset from: {}", csv_dir.display());
    let dataset = load_dataset(&csv_dir)
        .with_context(|| format!("Failed to load CSV export from {}", csv_dir.display()))?;
    match dataset_hash(&csv_dir) {
        Ok(hash) => tracing::info!("Dataset hash: {}", hash),
        Err(e) => tracing::warn!("Could not hash dataset: {}", e),
    }
    tracing::info!(
        "{} targets loaded ({} invalid), {} collections, {} subjects",
        dataset.targets.len(),
        dataset.invalid_targets.len(),
        dataset.collections.len(),
        dataset.subjects.len()
    );

    match &cli.action {
        Action::ListUrls => handle_list_urls(&dataset, &filter),
        Action::CsvToJson { output_file } => handle_csv_to_json(&dataset, output_file),
        Action::CrawlFeed { output_file } => handle_crawl_feed(&dataset, &filter, output_file),
        Action::GenAcl {
            format,
            omit_cdns,
            output_file,
        } => handle_gen_acl(&dataset, format, *omit_cdns, output_file),
        Action::GenAnnotations { output_file } => handle_gen_annotations(&dataset, output_file),
        Action::GenSite { output_dir } => handle_gen_site(&dataset, output_dir),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seedlist=info,warn"),
            1 => EnvFilter::new("seedlist=debug,info"),
            2 => EnvFilter::new("seedlist=trace,debug"),
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

/// Combines config-file defaults and CLI options into a Target filter
fn build_filter(cli: &Cli, config: &Config) -> anyhow::Result<TargetFilter> {
    let frequency = cli
        .frequency
        .clone()
        .unwrap_or_else(|| config.filters.frequency.clone());
    let terms_value = cli
        .terms
        .clone()
        .unwrap_or_else(|| config.filters.terms.clone());
    let terms = Terms::parse(&terms_value)
        .with_context(|| format!("Unrecognised terms filter '{}'", terms_value))?;

    Ok(TargetFilter {
        frequency: Some(frequency),
        terms,
        include_hidden: cli.include_hidden || config.filters.include_hidden,
        include_expired: cli.include_expired || config.filters.include_expired,
        omit_uk_tlds: cli.omit_uk_tlds || config.filters.omit_uk_tlds,
    })
}

/// Handles list-urls: prints each selected Target's seed URLs
fn handle_list_urls(dataset: &Dataset, filter: &TargetFilter) -> anyhow::Result<()> {
    for target in filter.apply(&dataset.targets) {
        for url in &target.urls {
            println!("{}", url);
        }
    }
    Ok(())
}

/// Handles csv-to-json: dumps the whole joined dataset
fn handle_csv_to_json(dataset: &Dataset, output_file: &Path) -> anyhow::Result<()> {
    let file = File::create(output_file)
        .with_context(|| format!("Failed to create {}", output_file.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), dataset)?;
    println!("✓ Dataset written to: {}", output_file.display());
    Ok(())
}

/// Handles crawl-feed: writes crawl-feed JSON for the selected Targets
fn handle_crawl_feed(
    dataset: &Dataset,
    filter: &TargetFilter,
    output_file: &Path,
) -> anyhow::Result<()> {
    let targets = filter.apply(&dataset.targets);
    let feed = generate_crawl_feed(&targets);
    let file = File::create(output_file)
        .with_context(|| format!("Failed to create {}", output_file.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &feed)?;
    println!(
        "✓ Crawl feed with {} targets written to: {}",
        feed.len(),
        output_file.display()
    );
    Ok(())
}

/// Handles gen-acl: builds the open-access allow list
///
/// The Target subset here is fixed rather than taken from the global
/// filter options: open-access terms, any frequency, hidden targets
/// excluded, expired targets kept (their archives remain viewable).
fn handle_gen_acl(
    dataset: &Dataset,
    format: &str,
    omit_cdns: bool,
    output_file: &Path,
) -> anyhow::Result<()> {
    let filter = TargetFilter {
        frequency: Some("all".to_string()),
        terms: Terms::Oa,
        include_hidden: false,
        include_expired: true,
        omit_uk_tlds: false,
    };
    let targets = filter.apply(&dataset.targets);
    let lines = build_access_list(&targets, !omit_cdns, format)?;

    let file = File::create(output_file)
        .with_context(|| format!("Failed to create {}", output_file.display()))?;
    let mut writer = BufWriter::new(file);
    for line in &lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    println!(
        "✓ Access list ({} entries, {} format) written to: {}",
        lines.len(),
        format,
        output_file.display()
    );
    Ok(())
}

/// Handles gen-annotations: writes search annotations for all Targets
fn handle_gen_annotations(dataset: &Dataset, output_file: &Path) -> anyhow::Result<()> {
    let annotations =
        generate_annotations(&dataset.targets, &dataset.collections, &dataset.subjects);
    let file = File::create(output_file)
        .with_context(|| format!("Failed to create {}", output_file.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &annotations)?;
    println!("✓ Annotations written to: {}", output_file.display());
    Ok(())
}

/// Handles gen-site: writes static-site source pages
fn handle_gen_site(dataset: &Dataset, output_dir: &Path) -> anyhow::Result<()> {
    let stats = generate_site(dataset, output_dir)?;
    println!(
        "✓ Site content written to: {} ({} target pages, {} collection pages)",
        output_dir.display(),
        stats.target_pages,
        stats.collection_pages
    );
    Ok(())
}
