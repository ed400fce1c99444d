//! speedgraph - speed test history charts
//!
//! Loads a directory of JSON speed test records, computes summary statistics
//! and a moving average for ping, download and upload, and renders static
//! time-series charts.

pub mod app;
pub mod charts;
pub mod config;
pub mod data;
pub mod stats;
pub mod summary;
