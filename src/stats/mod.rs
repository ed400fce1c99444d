//! Stats module - summary statistics and smoothing

mod calculator;

pub use calculator::{moving_average, summarize, StatsCalculator, StatsError, Summary, DEFAULT_WINDOW};
