//! Record Processor Module
//! Turns one raw speed test JSON record into a `Sample`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Divisor used to turn bits per second into megabits per second.
///
/// Historical result graphs were produced with `1024 * 1204`; it is kept so
/// that charts stay comparable with them.
pub const BITS_PER_MEGABIT: f64 = 1024.0 * 1204.0;

/// Timestamp layout written by the speed test tool, e.g. `2023-11-19T21:16:01.213086Z`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Deserialize)]
struct RawServer {
    name: String,
}

/// Subset of the speed test output we care about; other fields are ignored.
#[derive(Debug, Deserialize)]
struct RawRecord {
    server: RawServer,
    ping: f64,
    download: f64,
    upload: f64,
    timestamp: String,
}

/// One parsed speed test result.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub server_name: String,
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Seconds since the Unix epoch, keeping sub-second precision.
    pub fn epoch_seconds(&self) -> f64 {
        self.timestamp.timestamp() as f64
            + f64::from(self.timestamp.timestamp_subsec_micros()) / 1_000_000.0
    }
}

/// A numeric series that can be taken from samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Ping,
    Download,
    Upload,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Ping, Metric::Download, Metric::Upload];

    pub fn value(self, sample: &Sample) -> f64 {
        match self {
            Metric::Ping => sample.ping_ms,
            Metric::Download => sample.download_mbps,
            Metric::Upload => sample.upload_mbps,
        }
    }

    /// Values of this metric in sample order.
    pub fn series(self, samples: &[Sample]) -> Vec<f64> {
        samples.iter().map(|s| self.value(s)).collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Ping => "Ping",
            Metric::Download => "Download",
            Metric::Upload => "Upload",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Ping => "ms",
            Metric::Download | Metric::Upload => "mbps",
        }
    }

    /// Lowercase name used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            Metric::Ping => "ping",
            Metric::Download => "download",
            Metric::Upload => "upload",
        }
    }
}

/// Convert a raw bits-per-second reading to megabits per second.
pub fn bps_to_mbps(bps: f64) -> f64 {
    (bps * 8.0) / BITS_PER_MEGABIT
}

/// Parse a record timestamp. The trailing `Z` is literal, so the result is UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|source| RecordError::Timestamp {
            value: value.to_string(),
            source,
        })
}

/// Handles turning record files into samples.
pub struct RecordProcessor;

impl RecordProcessor {
    /// Parse a record from its JSON text.
    pub fn parse_str(text: &str) -> Result<Sample, RecordError> {
        let raw: RawRecord = serde_json::from_str(text)?;
        let timestamp = parse_timestamp(&raw.timestamp)?;

        Ok(Sample {
            server_name: raw.server.name,
            ping_ms: raw.ping,
            download_mbps: bps_to_mbps(raw.download),
            upload_mbps: bps_to_mbps(raw.upload),
            timestamp,
        })
    }

    /// Read and parse a single record file.
    pub fn parse_file(path: &Path) -> Result<Sample, RecordError> {
        let text = fs::read_to_string(path)?;
        Self::parse_str(&text)
    }
}
