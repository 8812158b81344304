//! Input discovery for simulation logs.
//!
//! This module resolves the command-line inputs into an ordered list of
//! sources: files as given, directories walked recursively, and standard
//! input when nothing (or `-`) is named.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Argument that names standard input.
pub const STDIN_ARG: &str = "-";

/// Configuration for input discovery.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Extensions picked up when walking a directory (e.g., ["log", "out"])
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["log", "out", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl From<&crate::config::InputConfig> for ScanConfig {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
        }
    }
}

/// One source of log lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input.
    Stdin,
    /// A log file on disk.
    File(PathBuf),
}

impl InputSource {
    /// Open the source for buffered line reading.
    pub fn open(&self) -> io::Result<Box<dyn BufRead>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            InputSource::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolves command-line paths into input sources.
pub struct LogScanner {
    config: ScanConfig,
}

impl LogScanner {
    /// Create a new scanner.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Resolve paths in argument order. No paths means standard input.
    pub fn resolve(&self, paths: &[PathBuf]) -> Result<Vec<InputSource>> {
        if paths.is_empty() {
            debug!("No inputs given, reading standard input");
            return Ok(vec![InputSource::Stdin]);
        }

        let mut sources = Vec::new();
        for path in paths {
            if path.as_os_str() == STDIN_ARG {
                sources.push(InputSource::Stdin);
            } else if path.is_dir() {
                let found = self.walk_dir(path)?;
                if found.is_empty() {
                    warn!("No log files found under {}", path.display());
                }
                sources.extend(found);
            } else if path.exists() {
                sources.push(InputSource::File(path.clone()));
            } else {
                return Err(anyhow::anyhow!("Input not found: {}", path.display()));
            }
        }

        Ok(sources)
    }

    /// Check if a file found while walking should be read.
    pub fn matches(&self, path: &Path) -> bool {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config.extensions.iter().any(|allowed| allowed == ext)
    }

    /// Walk a directory recursively in file-name order.
    fn walk_dir(&self, dir: &Path) -> Result<Vec<InputSource>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to walk directory {}", dir.display()))?;

            if entry.file_type().is_file() && self.matches(entry.path()) {
                debug!("Found log file: {}", entry.path().display());
                files.push(InputSource::File(entry.into_path()));
            }
        }

        Ok(files)
    }
}

/// Hidden files and directories are skipped while walking.
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_paths_means_stdin() {
        let scanner = LogScanner::new(ScanConfig::default());
        let sources = scanner.resolve(&[]).unwrap();
        assert_eq!(sources, vec![InputSource::Stdin]);
    }

    #[test]
    fn test_dash_means_stdin() {
        let scanner = LogScanner::new(ScanConfig::default());
        let sources = scanner.resolve(&[PathBuf::from("-")]).unwrap();
        assert_eq!(sources, vec![InputSource::Stdin]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.log");

        let scanner = LogScanner::new(ScanConfig::default());
        let err = scanner.resolve(&[missing]).unwrap_err();
        assert!(err.to_string().contains("Input not found"));
    }

    #[test]
    fn test_files_keep_argument_order() {
        let temp_dir = TempDir::new().unwrap();
        let b = temp_dir.path().join("b.dat");
        let a = temp_dir.path().join("a.dat");
        std::fs::write(&b, "").unwrap();
        std::fs::write(&a, "").unwrap();

        // Explicit files are taken regardless of extension
        let scanner = LogScanner::new(ScanConfig::default());
        let sources = scanner.resolve(&[b.clone(), a.clone()]).unwrap();
        assert_eq!(sources, vec![InputSource::File(b), InputSource::File(a)]);
    }

    #[test]
    fn test_directory_walk_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("p2")).unwrap();
        std::fs::create_dir(root.join(".cache")).unwrap();
        std::fs::write(root.join("run-2.log"), "").unwrap();
        std::fs::write(root.join("run-1.log"), "").unwrap();
        std::fs::write(root.join("notes.md"), "").unwrap();
        std::fs::write(root.join("p2").join("run-3.out"), "").unwrap();
        std::fs::write(root.join(".cache").join("stale.log"), "").unwrap();

        let scanner = LogScanner::new(ScanConfig::default());
        let sources = scanner.resolve(&[root.to_path_buf()]).unwrap();

        let names: Vec<String> = sources
            .iter()
            .map(|s| match s {
                InputSource::File(p) => p.strip_prefix(root).unwrap().display().to_string(),
                InputSource::Stdin => "-".to_string(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "p2/run-3.out".to_string(),
                "run-1.log".to_string(),
                "run-2.log".to_string()
            ]
        );
    }

    #[test]
    fn test_matches_uses_configured_extensions() {
        let scanner = LogScanner::new(ScanConfig {
            extensions: vec!["stdout".to_string()],
        });
        assert!(scanner.matches(Path::new("job.stdout")));
        assert!(!scanner.matches(Path::new("job.log")));
        assert!(!scanner.matches(Path::new("Makefile")));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(InputSource::Stdin.to_string(), "<stdin>");
        assert_eq!(
            InputSource::File(PathBuf::from("logs/a.log")).to_string(),
            "logs/a.log"
        );
    }
}
