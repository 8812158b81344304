//! Convergence plot rendering.
//!
//! Draws one dashed, marked series per polynomial degree with mesh
//! resolution on the horizontal axis and max error on the vertical axis,
//! both logarithmic. The image format follows the output extension:
//! `.svg` uses the SVG backend, `.png`, `.jpg`, `.jpeg` and `.bmp` the
//! bitmap backend. Any other extension is rejected before rendering.

pub mod legend;
pub mod style;

pub use style::{LineStyle, StyleOverflow};

use crate::analysis::group_by_degree;
use crate::config::PlotConfig;
use crate::models::Record;
use legend::{best_corner, Corner};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use style::{SeriesStyle, StyleTable};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Marker size in pixels.
const MARKER_SIZE: i32 = 5;

/// Ranges used when there is nothing to plot.
const EMPTY_X_RANGE: Range<f64> = 1.0..100.0;
const EMPTY_Y_RANGE: Range<f64> = 1e-6..1.0;

/// Errors raised while producing the plot.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error(
        "no plot style for degree {degree}; only degrees 1-{supported} have styles \
         (use style_overflow = \"cycle\" to reuse them)"
    )]
    UnsupportedDegree { degree: u32, supported: usize },

    #[error(
        "cannot write plot {path}: unsupported image extension '{extension}' \
         (use svg, png, jpg, jpeg or bmp)"
    )]
    UnsupportedFormat { path: String, extension: String },

    #[error("failed to render plot: {0}")]
    Render(String),

    #[error("failed to prepare output directory {path}")]
    Io {
        path: String,
        #[source]
        error: io::Error,
    },
}

fn render_error(err: impl std::fmt::Display) -> PlotError {
    PlotError::Render(err.to_string())
}

/// Image encoding chosen from the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Bitmap,
}

impl ImageFormat {
    /// Resolve the format from the path's extension.
    pub fn from_path(path: &Path) -> Result<Self, PlotError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" | "jpg" | "jpeg" | "bmp" => Ok(ImageFormat::Bitmap),
            _ => Err(PlotError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone)]
pub struct PlotSettings {
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub margin: u32,
    pub line_style: LineStyle,
    pub style_overflow: StyleOverflow,
}

impl From<&PlotConfig> for PlotSettings {
    fn from(config: &PlotConfig) -> Self {
        Self {
            output: PathBuf::from(&config.output),
            width: config.width,
            height: config.height,
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            margin: config.margin,
            line_style: config.line_style,
            style_overflow: config.style_overflow,
        }
    }
}

/// One degree's styled points, in drawing order.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub degree: u32,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
}

/// Log-axis extents.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRanges {
    pub x: Range<f64>,
    pub y: Range<f64>,
}

impl PlotRanges {
    /// Padded extents of all series points.
    pub fn from_series(series: &[PlotSeries]) -> Self {
        let points = || series.iter().flat_map(|s| s.points.iter());
        Self {
            x: log_range(points().map(|p| p.0), 1.25, EMPTY_X_RANGE),
            y: log_range(points().map(|p| p.1), 2.0, EMPTY_Y_RANGE),
        }
    }

    /// Map a data point into `[0, 1]` on both axes, in log space.
    pub fn normalize(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (log_fraction(x, &self.x), log_fraction(y, &self.y))
    }
}

fn log_range(values: impl Iterator<Item = f64>, pad: f64, empty: Range<f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return empty;
    }
    min / pad..max * pad
}

fn log_fraction(value: f64, range: &Range<f64>) -> f64 {
    let (lo, hi) = (range.start.ln(), range.end.ln());
    if hi <= lo {
        return 0.5;
    }
    ((value.ln() - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Group records by degree and resolve styles.
///
/// Fails before anything is drawn if a degree has no style under the
/// configured overflow policy. Points that cannot sit on log axes are
/// dropped with a warning.
pub fn build_series(records: &[Record], styles: &StyleTable) -> Result<Vec<PlotSeries>, PlotError> {
    let mut series = Vec::new();

    for (degree, group) in group_by_degree(records) {
        let style = styles.style_for(degree)?;

        let points: Vec<(f64, f64)> = group
            .iter()
            .filter(|r| r.mesh_res > 0 && r.max_error > 0.0 && r.max_error.is_finite())
            .map(|r| (f64::from(r.mesh_res), r.max_error))
            .collect();

        let skipped = group.len() - points.len();
        if skipped > 0 {
            warn!(
                "Skipping {} run(s) of degree {} with non-positive resolution or error",
                skipped, degree
            );
        }

        series.push(PlotSeries {
            degree,
            style,
            points,
        });
    }

    Ok(series)
}

/// Render the convergence plot for a record table.
pub fn render_convergence_plot(records: &[Record], settings: &PlotSettings) -> Result<(), PlotError> {
    let format = ImageFormat::from_path(&settings.output)?;
    let styles = StyleTable::new(settings.line_style, settings.style_overflow);
    debug!(
        "Style table covers {} degrees, overflow policy {:?}",
        styles.len(),
        settings.style_overflow
    );

    let series = build_series(records, &styles)?;
    let ranges = PlotRanges::from_series(&series);

    let normalized: Vec<(f64, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| ranges.normalize(*p)))
        .collect();
    let corner = best_corner(&normalized);
    debug!("Legend placed at {:?}", corner);

    prepare_output_dir(&settings.output)?;

    let size = (settings.width, settings.height);
    match format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(&settings.output, size).into_drawing_area();
            draw(root, &series, &ranges, corner, settings)?;
        }
        ImageFormat::Bitmap => {
            let root = BitMapBackend::new(&settings.output, size).into_drawing_area();
            draw(root, &series, &ranges, corner, settings)?;
        }
    }

    info!(
        "Wrote {} series to {}",
        series.len(),
        settings.output.display()
    );
    Ok(())
}

fn prepare_output_dir(output: &Path) -> Result<(), PlotError> {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|error| PlotError::Io {
                path: parent.display().to_string(),
                error,
            })
        }
        _ => Ok(()),
    }
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    series: &[PlotSeries],
    ranges: &PlotRanges,
    corner: Corner,
    settings: &PlotSettings,
) -> Result<(), PlotError> {
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&settings.title, ("sans-serif", 28))
        .margin(settings.margin)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(ranges.x.clone().log_scale(), ranges.y.clone().log_scale())
        .map_err(render_error)?;

    chart
        .configure_mesh()
        .x_desc(settings.x_label.as_str())
        .y_desc(settings.y_label.as_str())
        .y_label_formatter(&|v| format!("{:.0e}", v))
        .draw()
        .map_err(render_error)?;

    for s in series {
        debug!("Drawing degree {} with {} point(s)", s.degree, s.points.len());
        let color = s.style.color;
        let line = color.stroke_width(2);
        let points = s.points.iter().copied();

        let anno = match s.style.line {
            LineStyle::Solid => chart.draw_series(LineSeries::new(points, line)),
            LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 8, 5, line)),
        }
        .map_err(render_error)?;

        let legend_marker = s.style.marker.outline(MARKER_SIZE);
        anno.label(s.style.label.as_str()).legend(move |(x, y)| {
            EmptyElement::at((x + 10, y))
                + PathElement::new(vec![(-10, 0), (10, 0)], line)
                + Polygon::new(legend_marker.clone(), color.filled())
        });

        let marker = s.style.marker.outline(MARKER_SIZE);
        chart
            .draw_series(
                s.points
                    .iter()
                    .map(|&p| EmptyElement::at(p) + Polygon::new(marker.clone(), color.filled())),
            )
            .map_err(render_error)?;
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .position(corner.position())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_error)?;
    }

    root.present().map_err(render_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use style::Marker;

    fn create_test_record(degree: u32, mesh_res: u32, max_error: f64) -> Record {
        Record {
            problem: "test".to_string(),
            num_procs: 1,
            mesh_res,
            degree,
            quadrature_pts: 0,
            num_unknowns: 0,
            max_error,
        }
    }

    #[test]
    fn test_build_series_groups_and_sorts() {
        let records = vec![
            create_test_record(1, 4, 0.16),
            create_test_record(1, 16, 0.01),
            create_test_record(2, 8, 0.002),
            create_test_record(1, 8, 0.04),
        ];

        let series = build_series(&records, &StyleTable::new(LineStyle::Dashed, StyleOverflow::Fail)).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].degree, 1);
        assert_eq!(series[0].style.marker, Marker::TriangleRight);
        assert_eq!(
            series[0].points,
            vec![(16.0, 0.01), (8.0, 0.04), (4.0, 0.16)]
        );
        assert_eq!(series[1].style.label, "deg: 2");
    }

    #[test]
    fn test_build_series_skips_unplottable_points() {
        let records = vec![
            create_test_record(1, 0, 0.1),
            create_test_record(1, 4, 0.0),
            create_test_record(1, 8, 0.05),
        ];

        let series = build_series(&records, &StyleTable::new(LineStyle::Dashed, StyleOverflow::Cycle)).unwrap();
        assert_eq!(series[0].points, vec![(8.0, 0.05)]);
    }

    #[test]
    fn test_build_series_fails_fast_on_unknown_degree() {
        let records = vec![create_test_record(1, 4, 0.1), create_test_record(6, 4, 0.1)];
        let err = build_series(&records, &StyleTable::new(LineStyle::Dashed, StyleOverflow::Fail)).unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedDegree { degree: 6, .. }));
    }

    #[test]
    fn test_render_fails_before_writing_output() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut settings = PlotSettings::from(&Config::default().plot);
        settings.output = temp_dir.path().join("out").join("plot.png");
        settings.style_overflow = StyleOverflow::Fail;

        let err = render_convergence_plot(&[create_test_record(9, 4, 0.1)], &settings).unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedDegree { .. }));
        assert!(!settings.output.exists());
    }

    fn temp_settings(temp_dir: &tempfile::TempDir, file_name: &str) -> PlotSettings {
        let mut settings = PlotSettings::from(&Config::default().plot);
        settings.output = temp_dir.path().join(file_name);
        settings.width = 320;
        settings.height = 240;
        settings
    }

    #[test]
    fn test_image_format_from_extension() {
        let cases = [
            ("plot.svg", ImageFormat::Svg),
            ("figures/PLOT.SVG", ImageFormat::Svg),
            ("h_ref_plot.png", ImageFormat::Bitmap),
            ("plot.jpg", ImageFormat::Bitmap),
            ("plot.JPEG", ImageFormat::Bitmap),
            ("plot.bmp", ImageFormat::Bitmap),
        ];
        for (path, expected) in cases {
            assert_eq!(ImageFormat::from_path(Path::new(path)).unwrap(), expected, "path: {}", path);
        }
    }

    #[test]
    fn test_image_format_rejects_unknown_extension() {
        let err = ImageFormat::from_path(Path::new("study.pdf")).unwrap_err();
        assert!(matches!(
            &err,
            PlotError::UnsupportedFormat { extension, .. } if extension == "pdf"
        ));
        assert!(err.to_string().contains("use svg, png, jpg, jpeg or bmp"));

        let err = ImageFormat::from_path(Path::new("plot")).unwrap_err();
        assert!(matches!(
            err,
            PlotError::UnsupportedFormat { extension, .. } if extension.is_empty()
        ));
    }

    #[test]
    fn test_render_rejects_unknown_extension() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let records = [create_test_record(1, 4, 0.1), create_test_record(1, 8, 0.02)];

        for name in ["study.pdf", "plot"] {
            let settings = temp_settings(&temp_dir, name);
            let err = render_convergence_plot(&records, &settings).unwrap_err();
            assert!(matches!(err, PlotError::UnsupportedFormat { .. }), "name: {}", name);
            assert!(!settings.output.exists());
        }
    }

    #[test]
    fn test_render_empty_table_writes_svg() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = temp_settings(&temp_dir, "empty.svg");

        render_convergence_plot(&[], &settings).unwrap();

        let content = std::fs::read_to_string(&settings.output).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_render_writes_png() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = temp_settings(&temp_dir, "h_ref_plot.png");
        let records = vec![
            create_test_record(1, 4, 0.16),
            create_test_record(1, 8, 0.04),
            create_test_record(2, 8, 0.002),
        ];

        render_convergence_plot(&records, &settings).unwrap();

        let bytes = std::fs::read(&settings.output).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let settings = temp_settings(&temp_dir, "plot.svg");
        std::fs::write(&settings.output, "stale").unwrap();

        render_convergence_plot(&[create_test_record(1, 4, 0.1)], &settings).unwrap();

        let content = std::fs::read_to_string(&settings.output).unwrap();
        assert_ne!(content, "stale");
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_prepare_output_dir_creates_parents() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let output = temp_dir.path().join("figures").join("study").join("plot.svg");

        prepare_output_dir(&output).unwrap();
        assert!(output.parent().unwrap().is_dir());

        // Bare file names need no directory
        prepare_output_dir(Path::new("plot.png")).unwrap();
    }

    #[test]
    fn test_ranges_pad_data() {
        let series = build_series(
            &[create_test_record(1, 4, 0.1), create_test_record(1, 16, 0.001)],
            &StyleTable::new(LineStyle::Dashed, StyleOverflow::Cycle),
        )
        .unwrap();

        let ranges = PlotRanges::from_series(&series);
        assert!((ranges.x.start - 3.2).abs() < 1e-12);
        assert!((ranges.x.end - 20.0).abs() < 1e-12);
        assert!((ranges.y.start - 0.0005).abs() < 1e-12);
        assert!((ranges.y.end - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_ranges_for_empty_table() {
        let ranges = PlotRanges::from_series(&[]);
        assert_eq!(ranges.x, EMPTY_X_RANGE);
        assert_eq!(ranges.y, EMPTY_Y_RANGE);
    }

    #[test]
    fn test_normalize_in_log_space() {
        let ranges = PlotRanges {
            x: 1.0..100.0,
            y: 1e-4..1.0,
        };
        let (x, y) = ranges.normalize((10.0, 1e-2));
        assert!((x - 0.5).abs() < 1e-12);
        assert!((y - 0.5).abs() < 1e-12);

        assert_eq!(ranges.normalize((1000.0, 1e-9)), (1.0, 0.0));
    }

    #[test]
    fn test_settings_from_default_config() {
        let settings = PlotSettings::from(&Config::default().plot);
        assert_eq!(settings.output, PathBuf::from("h_ref_plot.png"));
        assert_eq!(settings.title, "Convergence by h Refinement");
        assert_eq!(settings.x_label, "h");
        assert_eq!(settings.y_label, "Max Error");
        assert_eq!(settings.line_style, LineStyle::Dashed);
        assert_eq!(settings.style_overflow, StyleOverflow::Cycle);
    }
}
