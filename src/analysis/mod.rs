//! Convergence analysis over parsed records.
//!
//! Grouping, ordering and observed-rate computation shared by the
//! console report and the plotter.

pub mod aggregator;

pub use aggregator::*;
