//! Series styles for the convergence plot.
//!
//! Degrees 1 through 4 have a fixed marker. Other degrees are handled
//! according to `StyleOverflow`. All series share one line style.

use super::PlotError;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// What to do with a degree that has no entry in the style table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StyleOverflow {
    /// Reuse table entries in order, wrapping around (default)
    #[default]
    Cycle,
    /// Abort with an error
    Fail,
}

/// Point marker shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    TriangleRight,
    Square,
    Circle,
    Star,
}

impl Marker {
    /// Polygon outline in pixel offsets around the point, y pointing down.
    pub fn outline(&self, size: i32) -> Vec<(i32, i32)> {
        match self {
            Marker::TriangleRight => vec![(-size, -size), (size, 0), (-size, size)],
            Marker::Square => {
                let s = size * 4 / 5;
                vec![(-s, -s), (s, -s), (s, s), (-s, s)]
            }
            Marker::Circle => regular_outline(16, |_| f64::from(size)),
            Marker::Star => regular_outline(10, |i| {
                if i % 2 == 0 {
                    f64::from(size)
                } else {
                    f64::from(size) * 0.4
                }
            }),
        }
    }
}

/// Points spaced evenly around the origin, starting straight up.
fn regular_outline(points: usize, radius: impl Fn(usize) -> f64) -> Vec<(i32, i32)> {
    (0..points)
        .map(|i| {
            let angle = -std::f64::consts::FRAC_PI_2
                + 2.0 * std::f64::consts::PI * i as f64 / points as f64;
            let r = radius(i);
            ((r * angle.cos()).round() as i32, (r * angle.sin()).round() as i32)
        })
        .collect()
}

/// Connecting line style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    #[default]
    Dashed,
}

/// Resolved style for one degree's series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub marker: Marker,
    pub line: LineStyle,
    pub color: RGBColor,
    pub label: String,
}

/// Matplotlib's default categorical cycle.
const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Mapping from polynomial degree to series style.
#[derive(Debug, Clone)]
pub struct StyleTable {
    markers: Vec<Marker>,
    line: LineStyle,
    overflow: StyleOverflow,
}

impl StyleTable {
    /// Table for degrees 1-4 with the given line style and overflow policy.
    pub fn new(line: LineStyle, overflow: StyleOverflow) -> Self {
        Self {
            markers: vec![
                Marker::TriangleRight,
                Marker::Square,
                Marker::Circle,
                Marker::Star,
            ],
            line,
            overflow,
        }
    }

    /// Number of degrees with a dedicated style.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Resolve the style for a degree.
    pub fn style_for(&self, degree: u32) -> Result<SeriesStyle, PlotError> {
        let len = self.markers.len();
        let degree_index = degree as usize;

        let index = if (1..=len).contains(&degree_index) {
            degree_index - 1
        } else {
            match self.overflow {
                StyleOverflow::Cycle => (degree_index + len - 1) % len,
                StyleOverflow::Fail => {
                    return Err(PlotError::UnsupportedDegree {
                        degree,
                        supported: len,
                    })
                }
            }
        };

        Ok(SeriesStyle {
            marker: self.markers[index],
            line: self.line,
            color: TAB10[(degree_index + TAB10.len() - 1) % TAB10.len()],
            label: format!("deg: {}", degree),
        })
    }
}
