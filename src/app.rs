//! Run orchestration: load, summarize, render.

use crate::charts::{ChartPlotter, StaticChartRenderer};
use crate::config::{ChartMode, Config};
use crate::data::{DataLoader, LoadReport, Metric, Sample};
use crate::summary::{self, MetricSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: LoadReport,
    pub written: Vec<PathBuf>,
    pub summaries: Vec<MetricSummary>,
}

/// `<stem>_<metric>.<ext>` next to `base`; the extension defaults to png.
pub fn metric_path(base: &Path, metric: Metric) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("graph");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("png");
    base.with_file_name(format!("{}_{}.{}", stem, metric.slug(), ext))
}

/// `base` itself, with `.png` appended when it has no extension.
pub fn single_chart_path(base: &Path) -> PathBuf {
    if base.extension().is_some() {
        base.to_path_buf()
    } else {
        base.with_extension("png")
    }
}

/// Render the charts selected by `config.mode` and return the written paths.
pub fn render_all(config: &Config, samples: &[Sample]) -> Result<Vec<PathBuf>> {
    let renderer = StaticChartRenderer::new(config.width, config.height);
    let times: Vec<DateTime<Utc>> = samples.iter().map(|s| s.timestamp).collect();
    let mut written = Vec::new();

    match config.mode {
        ChartMode::Statistics => {
            for metric in Metric::ALL {
                let path = metric_path(&config.outfile, metric);
                let chart = ChartPlotter::statistics_chart(metric, samples, config.smoothing_window)
                    .with_context(|| format!("failed to compute {} statistics", metric.slug()))?;
                renderer
                    .render(&times, &chart, &path)
                    .with_context(|| format!("failed to render {} chart", metric.slug()))?;
                written.push(path);
            }
        }
        ChartMode::Transfer => {
            let path = single_chart_path(&config.outfile);
            let chart = ChartPlotter::transfer_chart(samples)
                .context("failed to build transfer chart")?;
            renderer
                .render(&times, &chart, &path)
                .context("failed to render transfer chart")?;
            written.push(path);
        }
        ChartMode::Ping => {
            let path = single_chart_path(&config.outfile);
            let chart = ChartPlotter::ping_chart(samples).context("failed to build ping chart")?;
            renderer
                .render(&times, &chart, &path)
                .context("failed to render ping chart")?;
            written.push(path);
        }
    }

    for path in &written {
        info!(path = %path.display(), "wrote chart");
    }
    Ok(written)
}

/// Load the records, then summarize and chart them.
///
/// An empty sample set is reported and ends the run without charts.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let loader = DataLoader::new(&config.src_dir, config.time_window);
    let report = loader
        .load_with_report()
        .with_context(|| format!("failed to load records from {}", config.src_dir.display()))?;

    if report.samples.is_empty() {
        warn!(
            directory = %config.src_dir.display(),
            skipped = report.skipped.len(),
            "no samples in the requested time range, nothing to chart"
        );
        return Ok(RunOutcome {
            report,
            written: Vec::new(),
            summaries: Vec::new(),
        });
    }

    let summaries = if config.summary {
        summary::summarize_samples(&report.samples).context("failed to summarize samples")?
    } else {
        Vec::new()
    };

    let written = render_all(config, &report.samples)?;

    Ok(RunOutcome {
        report,
        written,
        summaries,
    })
}
