//! Text summary builder for CLI output.
//!
//! Computes per-metric statistics and formats them as human-readable lines
//! or as JSON.

use crate::data::{Metric, Sample};
use crate::stats::{StatsCalculator, StatsError, Summary};
use serde::Serialize;

/// Statistics for one metric over a loaded sample set.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub metric: &'static str,
    pub unit: &'static str,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Summarize ping, download and upload over `samples`.
pub fn summarize_samples(samples: &[Sample]) -> Result<Vec<MetricSummary>, StatsError> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            Ok(MetricSummary {
                metric: metric.slug(),
                unit: metric.unit(),
                summary: StatsCalculator::summarize(&metric.series(samples))?,
            })
        })
        .collect()
}

/// One line per metric.
pub fn format_lines(summaries: &[MetricSummary]) -> Vec<String> {
    summaries
        .iter()
        .map(|m| {
            let s = &m.summary;
            format!(
                "{:<9} avg {:.2} med {:.2} p10 {:.2} p90 {:.2} min {:.2} max {:.2} {} (n={})",
                format!("{}:", m.metric),
                s.mean,
                s.median,
                s.p10,
                s.p90,
                s.min,
                s.max,
                m.unit,
                s.count
            )
        })
        .collect()
}

pub fn to_json(summaries: &[MetricSummary]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample(ping: f64) -> Sample {
        Sample {
            server_name: "test".to_string(),
            ping_ms: ping,
            download_mbps: 100.0,
            upload_mbps: 10.0,
            timestamp: Utc.with_ymd_and_hms(2023, 11, 19, 21, 0, 0).unwrap(),
        }
    }

    #[test]
    fn summarizes_every_metric() {
        let samples: Vec<Sample> = [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().map(sample).collect();
        let summaries = summarize_samples(&samples).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].metric, "ping");
        assert_eq!(summaries[0].summary.mean, 3.0);
        assert_eq!(summaries[1].summary.median, 100.0);

        let lines = format_lines(&summaries);
        assert_eq!(
            lines[0],
            "ping:     avg 3.00 med 3.00 p10 1.40 p90 4.60 min 1.00 max 5.00 ms (n=5)"
        );
    }

    #[test]
    fn json_flattens_summary_fields() {
        let summaries = summarize_samples(&[sample(7.0)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&summaries).unwrap()).unwrap();
        assert_eq!(value[0]["metric"], "ping");
        assert_eq!(value[0]["mean"], 7.0);
        assert_eq!(value[2]["unit"], "mbps");
    }

    #[test]
    fn empty_samples_fail() {
        assert!(summarize_samples(&[]).is_err());
    }
}
