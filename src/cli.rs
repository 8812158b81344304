//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::plot::StyleOverflow;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// convplot - convergence plots from simulation logs
///
/// Scans simulation logs for problem blocks, prints the parsed runs as a
/// table and plots max error against mesh resolution, one series per
/// polynomial degree.
///
/// Examples:
///   convplot runs/*.log
///   mpiexec -n 4 ./navierstokes -problem euler_vortex | convplot
///   convplot logs/ --output figures/h_ref.svg
///   convplot study.log --format json --no-plot
///   convplot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Log files or directories to scan, in order
    ///
    /// Directories are searched recursively. Use `-` for standard input.
    /// With no inputs, standard input is read.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output image path (default: h_ref_plot.png)
    ///
    /// The extension picks the format: svg, png, jpg, jpeg or bmp.
    #[arg(short, long, value_name = "FILE", env = "CONVPLOT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .convplot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Format of the table printed to stdout (text, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Print the table only, without writing a plot
    #[arg(long)]
    pub no_plot: bool,

    /// Handling of degrees outside 1-4 (cycle, fail)
    #[arg(long, value_name = "POLICY")]
    pub style_overflow: Option<StyleOverflow>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .convplot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Format of the console table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text columns (default)
    #[default]
    Text,
    /// Markdown table
    Markdown,
    /// JSON document
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.as_os_str().is_empty() {
                return Err("Output path must not be empty".to_string());
            }
            if output.is_dir() {
                return Err(format!(
                    "Output path is a directory: {}",
                    output.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
