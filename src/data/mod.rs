//! Data module - speed test record loading and parsing

mod loader;
mod processor;

pub use loader::{load, DataLoader, LoadReport, LoaderError, SkippedFile, TimeWindow, RECORD_EXTENSION};
pub use processor::{
    bps_to_mbps, parse_timestamp, Metric, RecordError, RecordProcessor, Sample, BITS_PER_MEGABIT,
    TIMESTAMP_FORMAT,
};
