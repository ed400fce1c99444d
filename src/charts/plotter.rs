//! Chart Plotter Module
//! Builds chart descriptions (series, reference lines, titles) from samples.

use crate::charts::renderer::{format_tick, ChartError};
use crate::data::{Metric, Sample};
use crate::stats::{StatsCalculator, Summary};
use plotters::style::RGBColor;

/// Color palette
pub const PING_COLOR: RGBColor = RGBColor(155, 89, 182); // Purple
pub const DOWNLOAD_COLOR: RGBColor = RGBColor(231, 76, 60); // Red
pub const UPLOAD_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
pub const AVERAGE_COLOR: RGBColor = RGBColor(44, 62, 80); // Dark slate
pub const MEAN_COLOR: RGBColor = RGBColor(46, 204, 113); // Green
pub const MEDIAN_COLOR: RGBColor = RGBColor(243, 156, 18); // Orange
pub const P10_COLOR: RGBColor = RGBColor(149, 165, 166); // Grey
pub const P90_COLOR: RGBColor = RGBColor(96, 125, 139); // Blue Grey

/// Tick labels on statistic charts.
pub const STATISTICS_TICKS: usize = 11;
/// Tick labels on the legacy transfer and ping charts.
pub const LEGACY_TICKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    None,
    Circle,
    Cross,
}

/// One plotted line, aligned index-for-index with the time axis.
#[derive(Debug, Clone)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
    pub color: RGBColor,
    pub marker: Marker,
    pub stroke_width: u32,
}

/// Horizontal line at a constant value across the whole time span.
#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub label: String,
    pub value: f64,
    pub color: RGBColor,
}

/// Everything needed to draw one figure.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub reference_lines: Vec<ReferenceLine>,
    pub tick_count: usize,
}

pub fn metric_color(metric: Metric) -> RGBColor {
    match metric {
        Metric::Ping => PING_COLOR,
        Metric::Download => DOWNLOAD_COLOR,
        Metric::Upload => UPLOAD_COLOR,
    }
}

fn metric_title(metric: Metric) -> &'static str {
    match metric {
        Metric::Ping => "Ping times",
        Metric::Download => "Download speed",
        Metric::Upload => "Upload speed",
    }
}

/// Creates chart descriptions from loaded samples.
pub struct ChartPlotter;

impl ChartPlotter {
    /// "<prefix> from MM/DD HH:MM to MM/DD HH:MM" over the sample span.
    fn span_title(prefix: &str, samples: &[Sample]) -> Result<String, ChartError> {
        let (first, last) = match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => (first.timestamp, last.timestamp),
            _ => return Err(ChartError::InvalidInput("no samples to chart".to_string())),
        };
        Ok(format!(
            "{} from {} to {}",
            prefix,
            format_tick(first, 0.0),
            format_tick(last, 0.0)
        ))
    }

    /// Reference lines for the summary of one series.
    pub fn reference_lines(summary: &Summary, unit: &str) -> Vec<ReferenceLine> {
        let line = |name: &str, value: f64, color: RGBColor| ReferenceLine {
            label: format!("{} {:.2} {}", name, value, unit),
            value,
            color,
        };
        vec![
            line("Mean", summary.mean, MEAN_COLOR),
            line("Median", summary.median, MEDIAN_COLOR),
            line("10th percentile", summary.p10, P10_COLOR),
            line("90th percentile", summary.p90, P90_COLOR),
        ]
    }

    /// Raw series, its moving average and the summary reference lines.
    pub fn statistics_chart(
        metric: Metric,
        samples: &[Sample],
        window: usize,
    ) -> Result<Chart, ChartError> {
        let title = Self::span_title(metric_title(metric), samples)?;
        let values = metric.series(samples);
        let summary = StatsCalculator::summarize(&values)?;
        let averages = StatsCalculator::moving_average(&values, window);

        Ok(Chart {
            title,
            x_label: "time".to_string(),
            y_label: metric.unit().to_string(),
            series: vec![
                Series {
                    label: metric.label().to_string(),
                    values,
                    color: metric_color(metric),
                    marker: Marker::Circle,
                    stroke_width: 1,
                },
                Series {
                    label: format!("Moving average ({})", window.max(1)),
                    values: averages,
                    color: AVERAGE_COLOR,
                    marker: Marker::None,
                    stroke_width: 2,
                },
            ],
            reference_lines: Self::reference_lines(&summary, metric.unit()),
            tick_count: STATISTICS_TICKS,
        })
    }

    /// Download and upload on one chart, without statistics.
    pub fn transfer_chart(samples: &[Sample]) -> Result<Chart, ChartError> {
        Ok(Chart {
            title: Self::span_title("Transfer speed", samples)?,
            x_label: "time".to_string(),
            y_label: Metric::Download.unit().to_string(),
            series: vec![
                Series {
                    label: Metric::Download.label().to_string(),
                    values: Metric::Download.series(samples),
                    color: DOWNLOAD_COLOR,
                    marker: Marker::Circle,
                    stroke_width: 1,
                },
                Series {
                    label: Metric::Upload.label().to_string(),
                    values: Metric::Upload.series(samples),
                    color: UPLOAD_COLOR,
                    marker: Marker::Cross,
                    stroke_width: 1,
                },
            ],
            reference_lines: Vec::new(),
            tick_count: LEGACY_TICKS,
        })
    }

    /// Ping times only, without statistics.
    pub fn ping_chart(samples: &[Sample]) -> Result<Chart, ChartError> {
        Ok(Chart {
            title: Self::span_title(metric_title(Metric::Ping), samples)?,
            x_label: "time".to_string(),
            y_label: Metric::Ping.unit().to_string(),
            series: vec![Series {
                label: Metric::Ping.label().to_string(),
                values: Metric::Ping.series(samples),
                color: UPLOAD_COLOR,
                marker: Marker::Cross,
                stroke_width: 1,
            }],
            reference_lines: Vec::new(),
            tick_count: LEGACY_TICKS,
        })
    }
}
