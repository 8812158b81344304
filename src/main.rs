//! convplot - convergence plots from simulation logs
//!
//! A CLI tool that scans simulation run logs for convergence-study
//! metadata, prints the runs as a table and plots max error against
//! mesh resolution grouped by polynomial degree.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (missing input, unparsable log value, unsupported
//!       degree, plot rendering failure)

mod analysis;
mod cli;
mod config;
mod models;
mod plot;
mod reader;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use plot::{ImageFormat, PlotSettings};
use scanner::{LogScanner, ScanConfig};
use std::io::Write;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("convplot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .convplot.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the plot output, labels and styles.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the table on stdout stays machine-readable.
/// `RUST_LOG`, when set, takes precedence over the verbosity flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Read all inputs, print the table, then plot.
fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    let settings = PlotSettings::from(&config.plot);

    // Reject an unusable plot path before reading any input
    if !args.no_plot {
        ImageFormat::from_path(&settings.output)?;
    }

    // Step 1: Resolve inputs
    let scanner = LogScanner::new(ScanConfig::from(&config.input));
    let sources = scanner.resolve(&args.files)?;
    debug!("Reading {} source(s)", sources.len());

    // Step 2: Parse every source into one table
    let records = reader::read_logs(&sources).context("Failed to read simulation logs")?;

    // Step 3: Print the table before any plotting
    let table = report::render_table(&records, config.report.format)?;
    {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(table.as_bytes())
            .and_then(|_| stdout.flush())
            .context("Failed to write table to stdout")?;
    }

    if args.no_plot {
        debug!("Plotting disabled with --no-plot");
        return Ok(());
    }

    // Step 4: Plot
    if records.is_empty() {
        warn!("No problem blocks found; the plot will have no series");
    }

    plot::render_convergence_plot(&records, &settings)
        .with_context(|| format!("Failed to write plot {}", settings.output.display()))?;

    eprintln!("📈 Plot saved to: {}", settings.output.display());
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
