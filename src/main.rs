//! trendz - Google Trends z-score calculator
//!
//! Sums monthly search interest across a folder of Google Trends CSV
//! exports and reports an inverted z-score of the latest month against
//! all earlier months.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any failure (no files, no data, insufficient history, zero variance)

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use ingest::{CsvFormat, CsvIngestor};
use models::Report;
use scanner::{FileScanner, ScanConfig};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("trendz v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args, &config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .trendz.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so stdout only carries the result.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("Warning: {:#}; using defaults", e);
            Ok(Config::default())
        }
    }
}

/// Scan, aggregate, score and print.
fn run(args: &Args, config: &Config) -> Result<()> {
    let data_dir = config.resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let file_scanner = FileScanner::new(data_dir, ScanConfig::from(&config.input));
    let files = file_scanner.scan()?;

    if args.dry_run {
        println!(
            "Found {} files in {}:",
            files.len(),
            file_scanner.data_dir().display()
        );
        for file in &files {
            println!("  {} ({} bytes)", file.name, file.size);
        }
        return Ok(());
    }

    let ingestor = CsvIngestor::new(CsvFormat::from(&config.format));
    let (monthly_values, summary) = ingest::aggregate_files(&files, &ingestor);

    for (month, value) in monthly_values.iter() {
        debug!("{}: {}", month, value);
    }

    let result = analysis::compute_z_score(&monthly_values)?;
    let precision = config.output.precision;

    let outcome = Report {
        generated_at: Utc::now(),
        data_dir: file_scanner.data_dir().display().to_string(),
        result,
        ingest: summary,
        monthly_values,
    };

    match args.format {
        OutputFormat::Text => {
            println!("{}", report::generate_text_report(&outcome.result, precision));
            if config.general.verbose {
                print!("{}", report::generate_details(&outcome, precision));
            }
        }
        OutputFormat::Json => {
            println!("{}", report::generate_json_report(&outcome)?);
        }
    }

    Ok(())
}
