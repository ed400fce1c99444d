//! Statistics Calculator Module
//! Descriptive statistics and moving averages for speed test series.

use serde::Serialize;
use statrs::statistics::Statistics;
use thiserror::Error;

/// Default number of points in the moving average window.
pub const DEFAULT_WINDOW: usize = 15;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Summary statistics for one series. Drawn as constant reference lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p10: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// Handles statistical calculations over plain `f64` series.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for a non-empty series.
    pub fn summarize(values: &[f64]) -> Result<Summary, StatsError> {
        let n = values.len();
        if n == 0 {
            return Err(StatsError::InvalidInput(
                "cannot summarize an empty series".to_string(),
            ));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(StatsError::InvalidInput("series contains NaN".to_string()));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        // statrs reports NaN for the sample deviation of a single point
        let std_dev = if n > 1 { values.std_dev() } else { 0.0 };

        Ok(Summary {
            count: n,
            mean: values.mean(),
            median,
            p10: Self::percentile(&sorted, 10.0),
            p90: Self::percentile(&sorted, 90.0),
            min: Statistics::min(values),
            max: Statistics::max(values),
            std_dev,
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    ///
    /// `sorted_values` must be sorted ascending.
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Approximately centered simple moving average.
    ///
    /// Every position starts with the average of the values seen so far,
    /// capped at `window_size` points. Once a full window is available its
    /// average is moved back by `window_size / 2` positions, so it sits over
    /// the middle of the points it covers. The output is always as long as
    /// the input, and a window of 0 behaves like 1.
    pub fn moving_average(values: &[f64], window_size: usize) -> Vec<f64> {
        let window = window_size.max(1);
        let shift = window / 2;
        let mut averages = Vec::with_capacity(values.len());

        for i in 0..values.len() {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            let avg = slice.iter().sum::<f64>() / slice.len() as f64;
            averages.push(avg);

            if slice.len() == window {
                averages[i - shift] = avg;
            }
        }

        averages
    }
}

/// Summarize a series. See [`StatsCalculator::summarize`].
pub fn summarize(values: &[f64]) -> Result<Summary, StatsError> {
    StatsCalculator::summarize(values)
}

/// Moving average of a series. See [`StatsCalculator::moving_average`].
pub fn moving_average(values: &[f64], window_size: usize) -> Vec<f64> {
    StatsCalculator::moving_average(values, window_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn summary_of_one_to_five() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert!(close(s.mean, 3.0));
        assert!(close(s.median, 3.0));
        assert!(close(s.p10, 1.4));
        assert!(close(s.p90, 4.6));
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert!(close(s.std_dev, 2.5f64.sqrt()));
    }

    #[test]
    fn summary_ignores_input_order() {
        let a = summarize(&[5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
        let b = summarize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(a.p10, b.p10));
        assert!(close(a.p90, b.p90));
        assert!(close(a.median, b.median));
    }

    #[test]
    fn median_of_even_length_averages_middle_pair() {
        let s = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!(close(s.median, 2.5));
    }

    #[test]
    fn single_value_summary() {
        let s = summarize(&[7.5]).unwrap();
        assert_eq!(s.mean, 7.5);
        assert_eq!(s.median, 7.5);
        assert_eq!(s.p10, 7.5);
        assert_eq!(s.p90, 7.5);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn empty_summary_is_invalid_input() {
        let err = summarize(&[]).unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput(_)));
    }

    #[test]
    fn nan_summary_is_invalid_input() {
        assert!(summarize(&[1.0, f64::NAN]).is_err());
    }

    #[test]
    fn percentile_endpoints() {
        let sorted = [10.0, 20.0, 30.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 0.0), 10.0);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 30.0);
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 20.0);
        assert!(close(StatsCalculator::percentile(&sorted, 25.0), 15.0));
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn moving_average_of_empty_is_empty() {
        assert!(moving_average(&[], DEFAULT_WINDOW).is_empty());
    }

    #[test]
    fn moving_average_keeps_constant_series() {
        assert_eq!(moving_average(&[5.0; 5], 3), vec![5.0; 5]);
    }

    #[test]
    fn moving_average_length_matches_for_any_window() {
        for len in 0..20 {
            let values: Vec<f64> = (0..len).map(|v| (v * v) as f64).collect();
            for window in 0..=len + 50 {
                let out = moving_average(&values, window);
                assert_eq!(out.len(), len, "len {len} window {window}");
                assert!(out.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn oversized_window_is_running_average() {
        let out = moving_average(&[1.0, 2.0, 3.0, 4.0], 10);
        assert_eq!(out, vec![1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn window_of_one_is_identity() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(moving_average(&values, 1), values.to_vec());
        assert_eq!(moving_average(&values, 0), values.to_vec());
    }

    #[test]
    fn full_windows_are_centered() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = moving_average(&values, 3);
        // position 0 keeps its growing average, the last keeps its trailing one
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0, 5.0, 5.0]);
    }

    #[test]
    fn linear_series_is_unchanged_inside_full_windows() {
        let values: Vec<f64> = (0..30).map(f64::from).collect();
        let out = moving_average(&values, 5);
        for i in 2..28 {
            assert!(close(out[i], values[i]), "index {i}");
        }
    }
}
