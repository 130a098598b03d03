use crate::aggregator::percentile;
use chrono::{DateTime, Timelike, Utc};
use core_types::{GraphMetric, Observation, Provider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One time bucket of a graph series: the bucket's left edge plus the metric
/// value per provider. A provider with no observations in the bucket maps to
/// `None`; absence of data must stay distinguishable from a measured zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketResult {
    pub bucket_start: DateTime<Utc>,
    pub values: HashMap<Provider, Option<f64>>,
}

/// Groups observations into fixed-width, left-aligned time buckets and
/// computes the requested metric per bucket per provider.
///
/// Buckets come out in ascending time order; buckets where no provider has
/// any observation are omitted entirely (sparse series).
pub fn bucketize(
    observations: &[Observation],
    bucket_width_minutes: u32,
    metric: GraphMetric,
    providers: &[Provider],
) -> Vec<BucketResult> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<&Observation>> = BTreeMap::new();
    for observation in observations {
        let start = bucket_start(observation.timestamp, bucket_width_minutes);
        buckets.entry(start).or_default().push(observation);
    }

    buckets
        .into_iter()
        .map(|(start, rows)| {
            let values: HashMap<Provider, Option<f64>> = providers
                .iter()
                .map(|&provider| {
                    let provider_rows: Vec<&&Observation> =
                        rows.iter().filter(|o| o.provider == provider).collect();
                    (provider, metric_value(&provider_rows, metric))
                })
                .collect();
            BucketResult {
                bucket_start: start,
                values,
            }
        })
        // A bucket populated only by providers outside the requested set
        // would be all-null; the series stays sparse instead.
        .filter(|result| result.values.values().any(|value| value.is_some()))
        .collect()
}

/// The left edge of the bucket containing `timestamp`: same hour and day,
/// minutes truncated down to a multiple of the width, seconds zeroed.
pub fn bucket_start(timestamp: DateTime<Utc>, bucket_width_minutes: u32) -> DateTime<Utc> {
    let width = bucket_width_minutes.max(1);
    let minute = timestamp.minute() - timestamp.minute() % width;
    timestamp
        .with_minute(minute)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}

fn metric_value(rows: &[&&Observation], metric: GraphMetric) -> Option<f64> {
    if rows.is_empty() {
        return None;
    }
    let n = rows.len() as f64;

    match metric {
        GraphMetric::FailedRequests => Some(rows.iter().filter(|o| !o.success).count() as f64),
        GraphMetric::AvgLatency => {
            Some(rows.iter().map(|o| o.latency_ms).sum::<f64>() / n)
        }
        GraphMetric::P95Latency => {
            let mut latencies: Vec<f64> = rows.iter().map(|o| o.latency_ms).collect();
            latencies.sort_by(|a, b| a.total_cmp(b));
            Some(percentile(&latencies, 0.95))
        }
        GraphMetric::SuccessRate => {
            let succeeded = rows.iter().filter(|o| o.success).count() as f64;
            Some(succeeded / n * 100.0)
        }
        GraphMetric::AccuracyRate => {
            let verdicts: Vec<bool> = rows.iter().filter_map(|o| o.is_accurate).collect();
            if verdicts.is_empty() {
                // Observations exist but none carry a verdict: still null,
                // not zero, since nothing was measured for accuracy.
                None
            } else {
                let accurate = verdicts.iter().filter(|&&a| a).count() as f64;
                Some(accurate / verdicts.len() as f64 * 100.0)
            }
        }
        GraphMetric::Throughput => Some(n),
    }
}
