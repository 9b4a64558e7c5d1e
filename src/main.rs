//! gdelt-harvest main entry point
//!
//! This is the command-line interface for the GDELT article harvester.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gdelt_harvest::config::{load_config_or_default, Config};
use gdelt_harvest::crawler::{run_crawl, CrawlJob, Strategy};
use gdelt_harvest::output::{default_output_path, print_statistics};
use gdelt_harvest::query::{Query, DEFAULT_LANGUAGE};
use gdelt_harvest::range::{parse_timestamp, Frequency, TimeRange};
use gdelt_harvest::InputError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// gdelt-harvest: bulk article lists from the GDELT DOC API
///
/// Collects every article matching a keyword query over a time range. The
/// API returns at most 250 articles per call, so windows that come back full
/// are split in half and fetched again until each result fits.
#[derive(Parser, Debug)]
#[command(name = "gdelt-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvest article lists from the GDELT DOC API", long_about = None)]
struct Cli {
    /// Keywords to search for; commas separate alternatives (OR), spaces
    /// inside a term make a phrase
    #[arg(short, long)]
    keywords: String,

    /// Name used in the output file (defaults to the keywords)
    #[arg(short, long)]
    name: Option<String>,

    /// Source language filter
    #[arg(short, long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Start of the time range (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
    #[arg(short, long, default_value = "2019-03-01")]
    from: String,

    /// End of the time range (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
    #[arg(short, long, default_value = "2023-03-01")]
    to: String,

    /// Seconds to wait before every API call
    #[arg(long)]
    timeout: Option<f64>,

    /// Crawl strategy
    #[arg(short, long, value_enum, ignore_case = true, default_value = "recursive")]
    strategy: StrategyArg,

    /// Bucket size for the iterative strategy (e.g. 1D, 12H, 1W)
    #[arg(long = "freq", visible_alias = "frequency", default_value = "1D")]
    frequency: Frequency,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write to this CSV file instead of the derived name
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Split full windows until every result fits
    #[value(alias = "r")]
    Recursive,

    /// One call per fixed-frequency bucket
    #[value(alias = "i")]
    Iterative,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config_or_default(Some(path.as_path()))
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => load_config_or_default(None)?,
    };

    // Everything the user typed is checked before the first request
    let job = build_job(&cli, &config)?;

    tracing::info!(
        "Crawling {} ({}) from {} to {} using {:?}",
        cli.keywords,
        job.query.language(),
        job.range.from(),
        job.range.to(),
        job.strategy
    );

    match run_crawl(&job, &config).await {
        Ok(stats) => {
            print_statistics(&stats, &job.output);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(anyhow::Error::new(e).context(format!(
                "partial results kept in {}",
                job.output.display()
            )))
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gdelt_harvest=info,warn"),
            1 => EnvFilter::new("gdelt_harvest=debug,info"),
            2 => EnvFilter::new("gdelt_harvest=trace,debug"),
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

/// Turns validated command-line input into a crawl job
fn build_job(cli: &Cli, config: &Config) -> anyhow::Result<CrawlJob> {
    let query = Query::parse(&cli.keywords, &cli.language)?;
    let range = TimeRange::new(parse_timestamp(&cli.from)?, parse_timestamp(&cli.to)?)?;

    let strategy = match cli.strategy {
        StrategyArg::Recursive => Strategy::Recursive,
        StrategyArg::Iterative => Strategy::Iterative(cli.frequency),
    };

    let delay_secs = cli.timeout.unwrap_or(config.crawler.request_delay_secs);
    let request_delay = Duration::try_from_secs_f64(delay_secs)
        .map_err(|_| InputError::Delay(delay_secs))?;

    let output = match &cli.output {
        Some(path) => path.clone(),
        None => {
            let name = cli.name.as_deref().unwrap_or(&cli.keywords);
            default_output_path(Path::new(&config.output.directory), name, &range)
        }
    };

    Ok(CrawlJob {
        query,
        range,
        strategy,
        output,
        request_delay,
    })
}
