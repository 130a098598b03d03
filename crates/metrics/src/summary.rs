use core_types::Provider;
use serde::{Deserialize, Serialize};

/// A standardized per-provider statistics report over one observation window.
///
/// This struct is the final output of the aggregator and serves as the data
/// transfer object for summary results throughout the system. An empty
/// window produces a zeroed report, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSummary {
    pub provider: Provider,

    // I. Volume
    pub requests: u64,
    pub failed: u64,
    /// Percentage of requests that completed successfully.
    pub success_rate: f64,

    // II. Latency
    pub avg_latency: f64,
    /// Nearest-rank median latency.
    pub p50_latency: f64,
    /// Nearest-rank 95th percentile latency.
    pub p95_latency: f64,

    // III. Accuracy
    /// Percentage of accuracy-verdict-carrying observations judged accurate.
    /// 0 when no observation in the window carries a verdict.
    pub accuracy_rate: f64,
    /// Mean of |deviation_pct| over observations with a defined deviation.
    pub avg_deviation: f64,

    // IV. Payload
    pub avg_response_size: f64,
}

impl ProviderSummary {
    /// Creates a zeroed summary for a provider with no observations.
    pub fn zeroed(provider: Provider) -> Self {
        Self {
            provider,
            requests: 0,
            failed: 0,
            success_rate: 0.0,
            avg_latency: 0.0,
            p50_latency: 0.0,
            p95_latency: 0.0,
            accuracy_rate: 0.0,
            avg_deviation: 0.0,
            avg_response_size: 0.0,
        }
    }
}
