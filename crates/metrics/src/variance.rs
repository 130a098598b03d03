use crate::bucketizer::bucket_start;
use chrono::{DateTime, Utc};
use core_types::{Observation, Provider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Cross-provider disagreement for one bucket and subject: the largest
/// absolute percentage deviation of any provider's bucketed mean price from
/// the bucket's reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariancePoint {
    pub bucket_start: DateTime<Utc>,
    /// The token symbol the prices belong to (from the `price_<symbol>`
    /// test type).
    pub subject: String,
    pub max_deviation_pct: f64,
}

/// Maximum absolute percentage deviation of any provider's price from the
/// reference. Defined as 0 when no reference is available; callers must
/// not read that as "no disagreement observed."
pub fn max_deviation(bucket_prices: &HashMap<Provider, f64>, reference_price: Option<f64>) -> f64 {
    let reference = match reference_price {
        Some(r) if r > 0.0 => r,
        _ => return 0.0,
    };

    bucket_prices
        .values()
        .map(|price| ((price - reference) / reference * 100.0).abs())
        .fold(0.0, f64::max)
}

/// Builds the cross-provider variance series for a window of observations.
///
/// Price observations are grouped by (bucket, subject). The bucket's
/// reference price is the mean of all of the reference provider's captured
/// values in that bucket; each other provider contributes the mean of its
/// own observed prices. Buckets without a reference value yield 0.
pub fn variance_series(
    observations: &[Observation],
    bucket_width_minutes: u32,
    reference: Provider,
) -> Vec<VariancePoint> {
    // (bucket, subject) -> provider -> observed prices
    let mut groups: BTreeMap<(DateTime<Utc>, String), HashMap<Provider, Vec<f64>>> =
        BTreeMap::new();

    for observation in observations {
        let Some(subject) = observation.test_type.strip_prefix("price_") else {
            continue;
        };
        let Some(value) = observation.observed_value else {
            continue;
        };
        let key = (
            bucket_start(observation.timestamp, bucket_width_minutes),
            subject.to_string(),
        );
        groups
            .entry(key)
            .or_default()
            .entry(observation.provider)
            .or_default()
            .push(value);
    }

    groups
        .into_iter()
        .map(|((start, subject), by_provider)| {
            let reference_price = by_provider.get(&reference).map(|prices| {
                prices.iter().sum::<f64>() / prices.len() as f64
            });

            let bucket_prices: HashMap<Provider, f64> = by_provider
                .iter()
                .filter(|(provider, _)| **provider != reference)
                .map(|(&provider, prices)| {
                    (provider, prices.iter().sum::<f64>() / prices.len() as f64)
                })
                .collect();

            VariancePoint {
                bucket_start: start,
                subject,
                max_deviation_pct: max_deviation(&bucket_prices, reference_price),
            }
        })
        .collect()
}
