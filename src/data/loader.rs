//! Speed Test Directory Loader
//! Scans a directory of JSON records, filters them to a time window and sorts them.

use crate::data::processor::{RecordProcessor, Sample};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File extension of speed test records.
pub const RECORD_EXTENSION: &str = ".json";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Inclusive time bounds in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    /// Build a window; a missing start is the epoch and a missing end is now.
    pub fn new(start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            start: start.unwrap_or(0.0),
            end: end.unwrap_or_else(now_epoch_seconds),
        }
    }

    /// Window that accepts every timestamp.
    pub fn unbounded() -> Self {
        Self {
            start: f64::NEG_INFINITY,
            end: f64::INFINITY,
        }
    }

    pub fn contains(&self, epoch_seconds: f64) -> bool {
        self.start <= epoch_seconds && epoch_seconds <= self.end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn now_epoch_seconds() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// A record file that could not be turned into a sample.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a directory scan.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Samples inside the window, ascending by timestamp.
    pub samples: Vec<Sample>,
    /// Files dropped because they could not be read or parsed.
    pub skipped: Vec<SkippedFile>,
    /// Parsed samples that fell outside the window.
    pub out_of_range: usize,
}

/// Loads speed test records from a single directory.
pub struct DataLoader {
    directory: PathBuf,
    window: TimeWindow,
}

impl DataLoader {
    pub fn new(directory: impl Into<PathBuf>, window: TimeWindow) -> Self {
        Self {
            directory: directory.into(),
            window,
        }
    }

    /// Load the samples inside the window, sorted by timestamp.
    pub fn load(&self) -> Result<Vec<Sample>, LoaderError> {
        Ok(self.load_with_report()?.samples)
    }

    /// Load the samples and also report which files were skipped.
    ///
    /// Only the immediate entries of the directory are scanned. A file that
    /// cannot be read or parsed is logged and skipped; it never aborts the scan.
    pub fn load_with_report(&self) -> Result<LoadReport, LoaderError> {
        let read_dir_err = |source| LoaderError::ReadDir {
            path: self.directory.clone(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let path = entry.path();
            let is_record = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(RECORD_EXTENSION));
            if !is_record {
                continue;
            }
            if !path.is_file() {
                debug!(path = %path.display(), "skipping non-file entry");
                continue;
            }
            paths.push(path);
        }
        // read_dir order is platform dependent; fix it so ties sort the same way every run
        paths.sort();

        let mut report = LoadReport::default();
        for path in paths {
            match RecordProcessor::parse_file(&path) {
                Ok(sample) => {
                    if self.window.contains(sample.epoch_seconds()) {
                        report.samples.push(sample);
                    } else {
                        report.out_of_range += 1;
                    }
                }
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "failed to process record");
                    report.skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }

        report.samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        info!(
            directory = %self.directory.display(),
            loaded = report.samples.len(),
            skipped = report.skipped.len(),
            out_of_range = report.out_of_range,
            "loaded speed test records"
        );

        Ok(report)
    }
}

/// Load the samples in `directory` whose timestamps lie in `window`.
pub fn load(directory: &Path, window: TimeWindow) -> Result<Vec<Sample>, LoaderError> {
    DataLoader::new(directory, window).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn record(ts: &str, download: f64) -> String {
        format!(
            r#"{{"server": {{"name": "test"}}, "ping": 10.0, "download": {download}, "upload": 1000.0, "timestamp": "{ts}"}}"#
        )
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = TimeWindow::new(Some(10.0), Some(20.0));
        assert!(window.contains(10.0));
        assert!(window.contains(20.0));
        assert!(!window.contains(9.999));
        assert!(!window.contains(20.001));
    }

    #[test]
    fn default_window_ends_now() {
        let before = now_epoch_seconds();
        let window = TimeWindow::default();
        assert_eq!(window.start, 0.0);
        assert!(window.end >= before);
    }

    #[test]
    fn corrupt_file_is_skipped() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.json"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::write(dir.path().join("b.json"), record("2023-11-19T21:05:00.000000Z", 2.0))?;
        fs::write(dir.path().join("c.json"), "{ not json")?;

        let report = DataLoader::new(dir.path(), TimeWindow::unbounded()).load_with_report()?;
        assert_eq!(report.samples.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("c.json"));
        Ok(())
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn corrupt_file_is_logged() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.json"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::write(dir.path().join("broken.json"), "{ not json")?;

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let report = tracing::subscriber::with_default(subscriber, || {
            DataLoader::new(dir.path(), TimeWindow::unbounded()).load_with_report()
        })?;
        assert_eq!(report.samples.len(), 1);

        let output = String::from_utf8(logs.0.lock().unwrap().clone())?;
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("failed to process record"), "{output}");
        assert!(output.contains("broken.json"), "{output}");
        Ok(())
    }

    #[test]
    fn ignores_other_extensions_and_subdirectories() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.json"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::write(dir.path().join("notes.txt"), "hello")?;
        fs::write(dir.path().join("a.json.bak"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::create_dir(dir.path().join("nested.json"))?;
        fs::write(
            dir.path().join("nested.json").join("inner.json"),
            record("2023-11-19T21:00:00.000000Z", 1.0),
        )?;

        let report = DataLoader::new(dir.path(), TimeWindow::unbounded()).load_with_report()?;
        assert_eq!(report.samples.len(), 1);
        assert!(report.skipped.is_empty());
        Ok(())
    }

    #[test]
    fn samples_are_sorted_regardless_of_names() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("1.json"), record("2023-11-19T23:00:00.000000Z", 3.0))?;
        fs::write(dir.path().join("2.json"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::write(dir.path().join("3.json"), record("2023-11-19T22:00:00.000000Z", 2.0))?;

        let samples = load(dir.path(), TimeWindow::unbounded())?;
        let hours: Vec<u32> = samples
            .iter()
            .map(|s| chrono::Timelike::hour(&s.timestamp))
            .collect();
        assert_eq!(hours, vec![21, 22, 23]);
        Ok(())
    }

    #[test]
    fn duplicate_timestamps_both_survive() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.json"), record("2023-11-19T21:00:00.000000Z", 1.0))?;
        fs::write(dir.path().join("b.json"), record("2023-11-19T21:00:00.000000Z", 2.0))?;

        let samples = load(dir.path(), TimeWindow::unbounded())?;
        assert_eq!(samples.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = load(&missing, TimeWindow::unbounded()).unwrap_err();
        assert!(matches!(err, LoaderError::ReadDir { .. }));
    }
}
