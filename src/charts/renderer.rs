//! Static Chart Renderer
//! Draws a `Chart` to a PNG or SVG file with plotters.
//!
//! Layout:
//! 1. Title centered above the plot
//! 2. X axis: seconds since the first sample, tick labels as `MM/DD HH:MM`
//! 3. Series lines with optional markers, then constant reference lines
//! 4. Legend in the upper left corner

use crate::charts::backend::FontTolerantBackend;
use crate::charts::plotter::{Chart, Marker};
use crate::stats::StatsError;
use chrono::{DateTime, Duration, Utc};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 900;

/// Tick label layout.
pub const TICK_FORMAT: &str = "%m/%d %H:%M";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("invalid chart input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("failed to draw {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },
}

/// Image format chosen from the output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// Format for `path`, or `None` when its extension is neither png nor svg.
    ///
    /// The bitmap backend picks its encoder from the extension, so anything
    /// other than `.png` would not produce a PNG.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("png") {
            Some(ImageFormat::Png)
        } else if ext.eq_ignore_ascii_case("svg") {
            Some(ImageFormat::Svg)
        } else {
            None
        }
    }
}

/// Format the instant `seconds` after `origin` as a tick label.
pub fn format_tick(origin: DateTime<Utc>, seconds: f64) -> String {
    let offset = Duration::milliseconds((seconds * 1000.0).round() as i64);
    (origin + offset).format(TICK_FORMAT).to_string()
}

/// Seconds from `origin` to `t`.
fn seconds_since(origin: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    (t - origin).num_milliseconds() as f64 / 1000.0
}

/// Y bounds covering every series and reference line, with some headroom.
fn y_range(chart: &Chart) -> (f64, f64) {
    let values = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .chain(chart.reference_lines.iter().map(|l| l.value))
        .filter(|v| v.is_finite());

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return (0.0, 1.0);
    }

    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.1
    } else {
        max.abs().max(1.0) * 0.1
    };
    let mut lo = min - pad;
    if min >= 0.0 && lo < 0.0 {
        lo = 0.0;
    }
    (lo, max + pad)
}

/// Renders chart descriptions to image files.
pub struct StaticChartRenderer {
    width: u32,
    height: u32,
}

impl Default for StaticChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl StaticChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Draw `chart` against `times` into `output_path`.
    ///
    /// Every series must have exactly one value per entry of `times`.
    pub fn render(
        &self,
        times: &[DateTime<Utc>],
        chart: &Chart,
        output_path: &Path,
    ) -> Result<(), ChartError> {
        let format = ImageFormat::from_path(output_path).ok_or_else(|| {
            ChartError::InvalidInput(format!(
                "{} must end in .png or .svg",
                output_path.display()
            ))
        })?;
        let origin = *times
            .first()
            .ok_or_else(|| ChartError::InvalidInput("time axis is empty".to_string()))?;
        for series in &chart.series {
            if series.values.len() != times.len() {
                return Err(ChartError::InvalidInput(format!(
                    "series {:?} has {} values but the time axis has {}",
                    series.label,
                    series.values.len(),
                    times.len()
                )));
            }
        }

        let xs: Vec<f64> = times.iter().map(|t| seconds_since(origin, *t)).collect();
        let draw_err = |message: String| ChartError::Draw {
            path: output_path.to_path_buf(),
            message,
        };

        match format {
            ImageFormat::Png => {
                let backend = BitMapBackend::new(output_path, (self.width, self.height));
                let root = FontTolerantBackend::new(backend).into_drawing_area();
                draw_chart(root, origin, &xs, chart).map_err(draw_err)?;
            }
            ImageFormat::Svg => {
                let backend = SVGBackend::new(output_path, (self.width, self.height));
                let root = FontTolerantBackend::new(backend).into_drawing_area();
                draw_chart(root, origin, &xs, chart).map_err(draw_err)?;
            }
        }

        debug!(
            path = %output_path.display(),
            format = ?format,
            points = times.len(),
            "rendered chart"
        );
        Ok(())
    }
}

fn draw_chart<DB>(
    root: DrawingArea<DB, Shift>,
    origin: DateTime<Utc>,
    xs: &[f64],
    chart: &Chart,
) -> Result<(), String>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let err = |e: DrawingAreaErrorKind<DB::ErrorType>| e.to_string();

    root.fill(&WHITE).map_err(err)?;

    let x_max = xs.last().copied().unwrap_or(0.0).max(1.0);
    let (y_min, y_max) = y_range(chart);

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(err)?;

    let tick_label = |seconds: &f64| format_tick(origin, *seconds);
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(chart.tick_count.max(2))
        .x_label_formatter(&tick_label)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()
        .map_err(err)?;

    for series in &chart.series {
        let color = series.color;
        let points: Vec<(f64, f64)> = xs
            .iter()
            .copied()
            .zip(series.values.iter().copied())
            .collect();

        ctx.draw_series(LineSeries::new(
            points.iter().copied(),
            color.stroke_width(series.stroke_width),
        ))
        .map_err(err)?
        .label(series.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        match series.marker {
            Marker::None => {}
            Marker::Circle => {
                ctx.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
                    .map_err(err)?;
            }
            Marker::Cross => {
                ctx.draw_series(points.iter().map(|&p| Cross::new(p, 4, color)))
                    .map_err(err)?;
            }
        }
    }

    for line in &chart.reference_lines {
        let color = line.color;
        ctx.draw_series(LineSeries::new(
            [(0.0, line.value), (x_max, line.value)],
            color.stroke_width(1),
        ))
        .map_err(err)?
        .label(line.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(1)));
    }

    ctx.configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(err)?;

    root.present().map_err(err)?;
    Ok(())
}
