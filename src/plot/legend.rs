//! Legend placement.

use plotters::chart::SeriesLabelPosition;

/// Plot corner that can host the legend box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperRight,
    UpperLeft,
    LowerLeft,
    LowerRight,
}

impl Corner {
    /// Candidates in tie-break order.
    pub const ALL: [Corner; 4] = [
        Corner::UpperRight,
        Corner::UpperLeft,
        Corner::LowerLeft,
        Corner::LowerRight,
    ];

    pub fn position(self) -> SeriesLabelPosition {
        match self {
            Corner::UpperRight => SeriesLabelPosition::UpperRight,
            Corner::UpperLeft => SeriesLabelPosition::UpperLeft,
            Corner::LowerLeft => SeriesLabelPosition::LowerLeft,
            Corner::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }

    /// Whether a normalized point (origin lower-left) falls in this corner's quadrant.
    fn contains(self, (x, y): (f64, f64)) -> bool {
        let right = x >= 0.5;
        let upper = y >= 0.5;
        match self {
            Corner::UpperRight => right && upper,
            Corner::UpperLeft => !right && upper,
            Corner::LowerLeft => !right && !upper,
            Corner::LowerRight => right && !upper,
        }
    }
}

/// Pick the corner whose quadrant holds the fewest points.
///
/// Points are in normalized plot coordinates, `[0, 1]` on both axes with
/// the origin at the lower left.
pub fn best_corner(points: &[(f64, f64)]) -> Corner {
    Corner::ALL
        .iter()
        .copied()
        .min_by_key(|corner| points.iter().filter(|p| corner.contains(**p)).count())
        .unwrap_or(Corner::UpperRight)
}
