//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.convplot.toml` files. Every setting defaults to the tool's built-in
//! behavior, so no configuration file is required.

use crate::cli::OutputFormat;
use crate::plot::{LineStyle, StyleOverflow};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".convplot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input discovery settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Plot settings.
    #[serde(default)]
    pub plot: PlotConfig,

    /// Console report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Input discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions read when a directory is given.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["log", "out", "txt"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Plot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Output image path; the extension (svg, png, jpg, jpeg, bmp) picks the format.
    #[serde(default = "default_output")]
    pub output: String,

    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Chart title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Horizontal axis label.
    #[serde(default = "default_x_label")]
    pub x_label: String,

    /// Vertical axis label.
    #[serde(default = "default_y_label")]
    pub y_label: String,

    /// Outer margin in pixels.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Line connecting each series' points (dashed, solid).
    #[serde(default)]
    pub line_style: LineStyle,

    /// Handling of degrees without a dedicated style.
    #[serde(default)]
    pub style_overflow: StyleOverflow,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            width: default_width(),
            height: default_height(),
            title: default_title(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            margin: default_margin(),
            line_style: LineStyle::default(),
            style_overflow: StyleOverflow::default(),
        }
    }
}

fn default_output() -> String {
    "h_ref_plot.png".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_title() -> String {
    "Convergence by h Refinement".to_string()
}

fn default_x_label() -> String {
    "h".to_string()
}

fn default_y_label() -> String {
    "Max Error".to_string()
}

fn default_margin() -> u32 {
    10
}

/// Console report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Format of the table printed to stdout.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.convplot.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref output) = args.output {
            self.plot.output = output.display().to_string();
        }
        if let Some(policy) = args.style_overflow {
            self.plot.style_overflow = policy;
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
