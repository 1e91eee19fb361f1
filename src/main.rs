use anyhow::{Context, Result};
use archive_finder::config::{find_config_file, load_config, Config};
use archive_finder::models::FindResult;
use archive_finder::patterns::archives;
use archive_finder::pipeline::{ArchiveFinder, DiscoveryOptions};
use archive_finder::ui::{self, result_line, summary_line, ScanProgress};
use archive_finder::utils::parse_doi_list;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Archive Finder - find dataset references in scientific papers
#[derive(Parser, Debug)]
#[command(name = "archive-finder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Find references to DANDI, OpenNeuro, Figshare and PhysioNet datasets in papers",
    long_about = None
)]
#[command(group(ArgGroup::new("input").required(true).args(["doi", "file", "discover"])))]
struct Cli {
    /// DOI of the paper to scan (bare, doi: or https://doi.org/ form)
    doi: Option<String>,

    /// File with one DOI per line; blank lines and # comments are skipped.
    /// Prints a JSON array, even for a single DOI
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Enable verbose logging (-v for source attempts, -vv for everything)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output and non-error logs
    #[arg(long, short)]
    quiet: bool,

    /// Search Europe PMC for candidate papers and scan them
    #[arg(long)]
    discover: bool,

    /// Discovery search query (defaults to the archive names)
    #[arg(long, requires = "discover")]
    query: Option<String>,

    /// Maximum number of candidate papers in discovery mode
    #[arg(long)]
    max_results: Option<usize>,

    /// Do not follow references to data descriptor papers in discovery mode
    #[arg(long)]
    no_follow_citations: bool,

    /// Write JSON to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity; logs go to stderr
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("archive_finder={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = apply_overrides(load_configuration(&cli)?, &cli);
    let finder = ArchiveFinder::from_config(&config).context("Failed to set up text sources")?;

    let show_progress = !cli.quiet && ui::is_terminal();
    let colored = ui::is_terminal();
    let started = Instant::now();

    let json = if cli.discover {
        let options = DiscoveryOptions::from_config(&config.discovery, archives());
        let mut total = options.max_results as u64;
        let progress = ScanProgress::new(total, show_progress);

        let results = finder
            .discover(&options, |result| {
                if progress.position() >= total {
                    total += 1;
                    progress.set_length(total);
                }
                progress.complete(&result_line(result, colored));
            })
            .await
            .context("Discovery search failed")?;
        progress.finish();

        report_summary(&results, started, &cli, colored);
        serde_json::to_string_pretty(&results)?
    } else if let Some(path) = &cli.file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read DOI file {}", path.display()))?;
        let dois = parse_doi_list(&content);
        if dois.is_empty() {
            tracing::warn!("No DOIs found in {}", path.display());
        }

        let progress = ScanProgress::new(dois.len() as u64, show_progress && dois.len() > 1);
        let results = finder
            .find_all(&dois, |result| progress.complete(&result_line(result, colored)))
            .await;
        progress.finish();

        report_summary(&results, started, &cli, colored);
        serde_json::to_string_pretty(&results)?
    } else {
        let doi = cli.doi.as_deref().unwrap_or_default();
        let result = finder.find_references(doi).await;
        serde_json::to_string_pretty(&result)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("Results written to {}", path.display());
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Load configuration from --config, the default locations, or the environment alone
fn load_configuration(cli: &Cli) -> Result<Config> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => find_config_file(),
    };

    if let Some(path) = &path {
        tracing::info!("Using config file: {}", path.display());
    }

    load_config(path.as_deref()).context("Invalid configuration")
}

/// Command-line flags take precedence over configuration
fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    if let Some(max_results) = cli.max_results {
        config.discovery.max_results = max_results;
    }
    if cli.no_follow_citations {
        config.discovery.follow_citations = false;
    }
    if let Some(query) = &cli.query {
        config.discovery.query = Some(query.clone());
    }
    config
}

fn report_summary(results: &[FindResult], started: Instant, cli: &Cli, colored: bool) {
    if !cli.quiet && results.len() > 1 {
        eprintln!("{}", summary_line(results, started.elapsed(), colored));
    }
}
