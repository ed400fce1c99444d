//! Command line arguments and the validated run configuration built from them.

use crate::charts::{ImageFormat, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::data::TimeWindow;
use crate::stats::DEFAULT_WINDOW;
use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Layout of `--start` and `--end`.
pub const CLI_TIME_FORMAT: &str = "%Y-%m-%d_%H:%M";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("bad --{flag} value {value:?}, expected YYYY-MM-DD_hh:mm: {source}")]
    BadDate {
        flag: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("--start ({start}) is after --end ({end})")]
    InvertedRange { start: String, end: String },
    #[error("--window must be at least 1")]
    InvalidWindow,
    #[error("chart size must be non-zero, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("source directory {} does not exist or is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),
    #[error("output directory {} does not exist or is not a directory", .0.display())]
    MissingOutputDir(PathBuf),
    #[error("output directory {} is read-only", .0.display())]
    ReadOnlyOutputDir(PathBuf),
    #[error("output file {} must end in .png or .svg", .0.display())]
    UnsupportedExtension(PathBuf),
}

/// Which charts a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartMode {
    /// One chart per metric with moving average and summary lines
    Statistics,
    /// Download and upload on a single chart
    Transfer,
    /// Ping times on a single chart
    Ping,
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "speedgraph",
    version,
    about = "Make graphs from speed test output"
)]
pub struct Cli {
    /// Directory holding one JSON speed test record per file
    #[arg(value_name = "SRC_DIR")]
    pub src_dir: PathBuf,

    /// The date to begin graphing (YYYY-MM-DD_hh:mm, UTC)
    #[arg(long)]
    pub start: Option<String>,

    /// The date to stop graphing (YYYY-MM-DD_hh:mm, UTC)
    #[arg(long)]
    pub end: Option<String>,

    /// Image file to create; in statistics mode the prefix of one file per metric
    #[arg(long, default_value = "graph")]
    pub outfile: PathBuf,

    /// Which charts to draw
    #[arg(long, value_enum, default_value_t = ChartMode::Statistics)]
    pub mode: ChartMode,

    /// Make the ping graph instead of the transfer graph (same as --mode ping)
    #[arg(long, conflicts_with = "mode")]
    pub ping: bool,

    /// Number of points in the moving average
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Chart width in pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Print summary statistics for each metric
    #[arg(long)]
    pub summary: bool,

    /// Print the summary as JSON
    #[arg(long, requires = "summary")]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings for one run, validated once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub src_dir: PathBuf,
    pub time_window: TimeWindow,
    pub outfile: PathBuf,
    pub mode: ChartMode,
    pub smoothing_window: usize,
    pub width: u32,
    pub height: u32,
    pub summary: bool,
    pub json: bool,
}

/// Parse a `--start`/`--end` value into epoch seconds (UTC).
pub fn parse_cli_time(flag: &'static str, value: &str) -> Result<f64, ConfigError> {
    NaiveDateTime::parse_from_str(value, CLI_TIME_FORMAT)
        .map(|naive| naive.and_utc().timestamp() as f64)
        .map_err(|source| ConfigError::BadDate {
            flag,
            value: value.to_string(),
            source,
        })
}

impl Config {
    /// Configuration with defaults for everything but the source directory.
    pub fn new(src_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            time_window: TimeWindow::default(),
            outfile: PathBuf::from("graph"),
            mode: ChartMode::Statistics,
            smoothing_window: DEFAULT_WINDOW,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            summary: false,
            json: false,
        }
    }

    /// Validate the arguments and build the configuration.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let start = cli
            .start
            .as_deref()
            .map(|v| parse_cli_time("start", v))
            .transpose()?;
        let end = cli
            .end
            .as_deref()
            .map(|v| parse_cli_time("end", v))
            .transpose()?;
        let time_window = TimeWindow::new(start, end);
        if time_window.start > time_window.end {
            return Err(ConfigError::InvertedRange {
                start: cli.start.clone().unwrap_or_else(|| "epoch".to_string()),
                end: cli.end.clone().unwrap_or_else(|| "now".to_string()),
            });
        }

        if cli.window == 0 {
            return Err(ConfigError::InvalidWindow);
        }
        if cli.width == 0 || cli.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: cli.width,
                height: cli.height,
            });
        }

        if !cli.src_dir.is_dir() {
            return Err(ConfigError::SourceNotDirectory(cli.src_dir.clone()));
        }
        check_output_file(&cli.outfile)?;
        check_output_dir(&cli.outfile)?;

        Ok(Self {
            src_dir: cli.src_dir.clone(),
            time_window,
            outfile: cli.outfile.clone(),
            mode: if cli.ping { ChartMode::Ping } else { cli.mode },
            smoothing_window: cli.window,
            width: cli.width,
            height: cli.height,
            summary: cli.summary,
            json: cli.json,
        })
    }
}

/// No extension means `.png` gets appended later.
fn check_output_file(outfile: &Path) -> Result<(), ConfigError> {
    if outfile.extension().is_some() && ImageFormat::from_path(outfile).is_none() {
        return Err(ConfigError::UnsupportedExtension(outfile.to_path_buf()));
    }
    Ok(())
}

fn check_output_dir(outfile: &Path) -> Result<(), ConfigError> {
    let dir = match outfile.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let metadata = match std::fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => metadata,
        _ => return Err(ConfigError::MissingOutputDir(dir.to_path_buf())),
    };
    if metadata.permissions().readonly() {
        return Err(ConfigError::ReadOnlyOutputDir(dir.to_path_buf()));
    }
    Ok(())
}
