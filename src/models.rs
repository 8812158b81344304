//! Data models for convergence-study runs.
//!
//! This module contains the flat record extracted from one problem block
//! of a simulation log, plus the summary structures derived from a table
//! of such records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Problem name used until a "Problem Name" line is seen.
pub const UNKNOWN_PROBLEM: &str = "unknown";

/// One simulation run, extracted from a single problem block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Name of the simulation case.
    pub problem: String,
    /// Parallel task count active when the block started.
    pub num_procs: u32,
    /// Linear subdivision count of the mesh.
    pub mesh_res: u32,
    /// Polynomial degree (basis node count minus one).
    pub degree: u32,
    /// Quadrature points per dimension.
    pub quadrature_pts: u32,
    /// Total discrete degrees of freedom.
    pub num_unknowns: u64,
    /// Error norm reported for the run.
    pub max_error: f64,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            problem: UNKNOWN_PROBLEM.to_string(),
            num_procs: 0,
            mesh_res: 0,
            degree: 0,
            quadrature_pts: 0,
            num_unknowns: 0,
            max_error: 0.0,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (procs={}, res={}, deg={}, q={}, dofs={}, err={:e})",
            self.problem,
            self.num_procs,
            self.mesh_res,
            self.degree,
            self.quadrature_pts,
            self.num_unknowns,
            self.max_error
        )
    }
}

/// Column names in table order.
pub const COLUMNS: [&str; 7] = [
    "problem",
    "num_procs",
    "mesh_res",
    "degree",
    "quadrature_pts",
    "num_unknowns",
    "max_error",
];

impl Record {
    /// Returns the record's fields formatted as table cells, in `COLUMNS` order.
    pub fn cells(&self) -> [String; 7] {
        [
            self.problem.clone(),
            self.num_procs.to_string(),
            self.mesh_res.to_string(),
            self.degree.to_string(),
            self.quadrature_pts.to_string(),
            self.num_unknowns.to_string(),
            format_error(self.max_error),
        ]
    }
}

/// Format an error norm the way a data-frame print would: plain decimals
/// for moderate magnitudes, scientific notation otherwise.
pub fn format_error(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 || (1e-4..1e6).contains(&magnitude) {
        let formatted = format!("{:.6}", value);
        let trimmed = formatted.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    } else {
        format!("{:.6e}", value)
    }
}

/// Ordered table of records, one row per problem block.
pub type RecordTable = Vec<Record>;

/// Per-degree summary of a convergence study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeSummary {
    /// Polynomial degree of the group.
    pub degree: u32,
    /// Number of runs in the group.
    pub runs: usize,
    /// Smallest error observed in the group.
    pub min_error: f64,
    /// Largest error observed in the group.
    pub max_error: f64,
    /// Observed rates between consecutive refinements, coarse to fine.
    pub rates: Vec<f64>,
}

impl DegreeSummary {
    /// Rate between the two finest runs, if any pair was usable.
    pub fn final_rate(&self) -> Option<f64> {
        self.rates.last().copied()
    }
}

/// Everything printed by `--format json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExport {
    /// Time the export was generated.
    pub generated_at: DateTime<Utc>,
    /// Parsed records in input order.
    pub records: RecordTable,
    /// Per-degree summaries in ascending degree order.
    pub summaries: Vec<DegreeSummary>,
}
