use crate::summary::ProviderSummary;
use core_types::{Observation, Provider};

/// Computes a per-provider summary over a window of observations.
///
/// Providers with no observations in the window get a zeroed summary; the
/// output always has one entry per requested provider, in request order.
pub fn summarize(observations: &[Observation], providers: &[Provider]) -> Vec<ProviderSummary> {
    providers
        .iter()
        .map(|&provider| summarize_provider(observations, provider))
        .collect()
}

fn summarize_provider(observations: &[Observation], provider: Provider) -> ProviderSummary {
    let rows: Vec<&Observation> = observations
        .iter()
        .filter(|o| o.provider == provider)
        .collect();

    if rows.is_empty() {
        return ProviderSummary::zeroed(provider);
    }

    let requests = rows.len() as u64;
    let failed = rows.iter().filter(|o| !o.success).count() as u64;

    let mut latencies: Vec<f64> = rows.iter().map(|o| o.latency_ms).collect();
    latencies.sort_by(|a, b| a.total_cmp(b));

    let with_verdict: Vec<bool> = rows.iter().filter_map(|o| o.is_accurate).collect();
    let accuracy_rate = if with_verdict.is_empty() {
        0.0
    } else {
        let accurate = with_verdict.iter().filter(|&&a| a).count();
        accurate as f64 / with_verdict.len() as f64 * 100.0
    };

    let deviations: Vec<f64> = rows.iter().filter_map(|o| o.deviation_pct).collect();
    let avg_deviation = if deviations.is_empty() {
        0.0
    } else {
        deviations.iter().map(|d| d.abs()).sum::<f64>() / deviations.len() as f64
    };

    ProviderSummary {
        provider,
        requests,
        failed,
        success_rate: (requests - failed) as f64 / requests as f64 * 100.0,
        avg_latency: mean(&latencies),
        p50_latency: percentile(&latencies, 0.5),
        p95_latency: percentile(&latencies, 0.95),
        accuracy_rate,
        avg_deviation,
        avg_response_size: mean_by(&rows, |o| o.response_size_bytes as f64),
    }
}

/// Nearest-rank percentile over an ascending-sorted sample: the value at
/// index `floor(n * q)`, clamped into bounds. No interpolation; ties and
/// duplicates are handled naturally by the sort. An empty sample yields 0.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = (sorted.len() as f64 * q).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn mean_by(rows: &[&Observation], f: impl Fn(&Observation) -> f64) -> f64 {
    if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|o| f(o)).sum::<f64>() / rows.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_types::ErrorKind;

    fn observation(provider: Provider, latency_ms: f64, success: bool) -> Observation {
        Observation {
            provider,
            test_type: "price_USDT".to_string(),
            latency_ms,
            success,
            error_kind: if success {
                ErrorKind::Success
            } else {
                ErrorKind::ServerError
            },
            observed_value: success.then_some(1.0),
            reference_value: None,
            is_accurate: None,
            deviation_pct: None,
            response_size_bytes: 256,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn empty_window_yields_zeroed_summaries() {
        let summaries = summarize(&[], Provider::benchmarked());
        assert_eq!(summaries.len(), 3);
        for summary in &summaries {
            assert_eq!(summary.requests, 0);
            assert_eq!(summary.failed, 0);
            assert_eq!(summary.success_rate, 0.0);
            assert_eq!(summary.avg_latency, 0.0);
            assert_eq!(summary.p50_latency, 0.0);
            assert_eq!(summary.p95_latency, 0.0);
            assert_eq!(summary.accuracy_rate, 0.0);
        }
    }

    #[test]
    fn request_counts_partition_the_window() {
        let mut observations = Vec::new();
        for _ in 0..4 {
            observations.push(observation(Provider::Alchemy, 100.0, true));
        }
        for _ in 0..3 {
            observations.push(observation(Provider::Mobula, 100.0, true));
        }
        observations.push(observation(Provider::Codex, 100.0, false));

        let summaries = summarize(&observations, Provider::benchmarked());
        let total: u64 = summaries.iter().map(|s| s.requests).sum();
        assert_eq!(total, observations.len() as u64);
    }

    #[test]
    fn success_and_failure_rates_are_complementary() {
        let observations = vec![
            observation(Provider::Alchemy, 80.0, true),
            observation(Provider::Alchemy, 90.0, true),
            observation(Provider::Alchemy, 100.0, false),
            observation(Provider::Alchemy, 110.0, false),
        ];

        let summary = &summarize(&observations, &[Provider::Alchemy])[0];
        assert_eq!(summary.requests, 4);
        assert_eq!(summary.failed, 2);
        let failed_pct = summary.failed as f64 / summary.requests as f64 * 100.0;
        assert!((summary.success_rate + failed_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn percentiles_use_the_nearest_rank_method() {
        let observations: Vec<Observation> = [100.0, 120.0, 130.0, 400.0, 150.0]
            .iter()
            .map(|&ms| observation(Provider::Mobula, ms, true))
            .collect();

        let summary = &summarize(&observations, &[Provider::Mobula])[0];
        // Sorted: [100, 120, 130, 150, 400]; index 2 and index 4.
        assert_eq!(summary.p50_latency, 130.0);
        assert_eq!(summary.p95_latency, 400.0);
        assert_eq!(summary.avg_latency, 180.0);
    }

    #[test]
    fn p50_never_exceeds_p95() {
        let samples: Vec<Vec<f64>> = vec![
            vec![5.0, 5.0],
            vec![1.0, 2.0, 3.0],
            vec![9.0, 1.0, 4.0, 4.0, 7.0, 2.0],
        ];
        for latencies in samples {
            let observations: Vec<Observation> = latencies
                .iter()
                .map(|&ms| observation(Provider::Codex, ms, true))
                .collect();
            let summary = &summarize(&observations, &[Provider::Codex])[0];
            assert!(summary.p50_latency <= summary.p95_latency);
        }
    }

    #[test]
    fn single_element_sample_is_both_percentiles() {
        let observations = vec![observation(Provider::Alchemy, 42.0, true)];
        let summary = &summarize(&observations, &[Provider::Alchemy])[0];
        assert_eq!(summary.p50_latency, 42.0);
        assert_eq!(summary.p95_latency, 42.0);
    }

    #[test]
    fn accuracy_rate_only_counts_observations_with_a_verdict() {
        let mut accurate = observation(Provider::Mobula, 50.0, true);
        accurate.is_accurate = Some(true);
        accurate.deviation_pct = Some(1.5);
        let mut inaccurate = observation(Provider::Mobula, 50.0, true);
        inaccurate.is_accurate = Some(false);
        inaccurate.deviation_pct = Some(-8.0);
        let no_verdict = observation(Provider::Mobula, 50.0, true);

        let summary = &summarize(&[accurate, inaccurate, no_verdict], &[Provider::Mobula])[0];
        assert_eq!(summary.accuracy_rate, 50.0);
        // Mean of |1.5| and |-8.0|.
        assert!((summary.avg_deviation - 4.75).abs() < 1e-9);
    }

    #[test]
    fn all_failed_window_is_well_formed() {
        let observations = vec![
            observation(Provider::Codex, 30.0, false),
            observation(Provider::Codex, 40.0, false),
        ];
        let summary = &summarize(&observations, &[Provider::Codex])[0];
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.accuracy_rate, 0.0);
    }
}
