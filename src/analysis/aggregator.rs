//! Record grouping and convergence statistics.
//!
//! This module partitions a record table by polynomial degree and computes
//! the observed order of accuracy between successive mesh refinements.

use crate::models::{DegreeSummary, Record};
use std::collections::BTreeMap;

/// Group records by degree, ascending, each group ordered by ascending max error.
pub fn group_by_degree(records: &[Record]) -> BTreeMap<u32, Vec<Record>> {
    let mut grouped: BTreeMap<u32, Vec<Record>> = BTreeMap::new();

    for record in records {
        grouped
            .entry(record.degree)
            .or_default()
            .push(record.clone());
    }

    for group in grouped.values_mut() {
        sort_by_max_error(group);
    }

    grouped
}

/// Sort records by ascending max error. Stable; NaN sorts last.
pub fn sort_by_max_error(records: &mut [Record]) {
    records.sort_by(|a, b| a.max_error.total_cmp(&b.max_error));
}

/// Observed rates between consecutive refinements.
///
/// Records are ordered by ascending mesh resolution; for each neighbouring
/// pair the rate is `ln(e_coarse / e_fine) / ln(n_fine / n_coarse)`. Pairs
/// with a repeated resolution or a non-positive error are skipped.
pub fn convergence_rates(records: &[Record]) -> Vec<f64> {
    let mut by_resolution: Vec<&Record> = records.iter().collect();
    by_resolution.sort_by_key(|r| r.mesh_res);

    by_resolution
        .windows(2)
        .filter_map(|pair| {
            let (coarse, fine) = (pair[0], pair[1]);
            if coarse.mesh_res == 0 || fine.mesh_res <= coarse.mesh_res {
                return None;
            }
            if coarse.max_error <= 0.0 || fine.max_error <= 0.0 {
                return None;
            }

            let error_ratio = coarse.max_error / fine.max_error;
            let refinement = f64::from(fine.mesh_res) / f64::from(coarse.mesh_res);
            Some(error_ratio.ln() / refinement.ln())
        })
        .collect()
}

/// Summarize each degree group, ascending by degree.
pub fn summarize(records: &[Record]) -> Vec<DegreeSummary> {
    group_by_degree(records)
        .into_iter()
        .map(|(degree, group)| {
            // Groups are sorted by max error, so the ends are the extremes
            let min_error = group.first().map(|r| r.max_error).unwrap_or(0.0);
            let max_error = group.last().map(|r| r.max_error).unwrap_or(0.0);

            DegreeSummary {
                degree,
                runs: group.len(),
                min_error,
                max_error,
                rates: convergence_rates(&group),
            }
        })
        .collect()
}
