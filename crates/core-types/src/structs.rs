use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ErrorKind, Provider};

/// One immutable record of a single provider probe's outcome.
///
/// An `Observation` is created exactly once, at the end of one timed network
/// call, and is never mutated afterwards; corrections are new observations.
///
/// Invariants:
/// - `error_kind == ErrorKind::Success` iff `success == true`.
/// - `is_accurate` and `deviation_pct` are both present or both absent
///   (they are functions of the same two optional inputs).
/// - `latency_ms >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub provider: Provider,
    /// Identifies the probe kind and subject, e.g. "price_USDT" or
    /// "wallet_balance".
    pub test_type: String,
    /// Wall-clock duration of the single network call, in milliseconds.
    pub latency_ms: f64,
    pub success: bool,
    pub error_kind: ErrorKind,
    /// The extracted price (price tests) or token count (wallet tests).
    /// Absent when the call failed or extraction found no usable value.
    pub observed_value: Option<f64>,
    /// The oracle value captured at the same logical iteration.
    pub reference_value: Option<f64>,
    /// Present only when both `observed_value` and `reference_value` exist.
    pub is_accurate: Option<bool>,
    /// Signed percentage difference of `observed_value` from
    /// `reference_value`. Present exactly when `is_accurate` is.
    pub deviation_pct: Option<f64>,
    /// Size of the serialized raw response body, recorded even for failed
    /// calls that returned a body.
    pub response_size_bytes: i64,
    pub timestamp: DateTime<Utc>,
}

/// Run-level totals for one orchestrated benchmark run. Transient: computed
/// and returned to the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub duration_seconds: f64,
    pub throughput: f64,
}

impl RunSummary {
    pub fn new(total_requests: u64, duration_seconds: f64) -> Self {
        let throughput = if duration_seconds > 0.0 {
            total_requests as f64 / duration_seconds
        } else {
            0.0
        };
        Self {
            total_requests,
            duration_seconds,
            throughput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_summary_computes_throughput() {
        let summary = RunSummary::new(30, 15.0);
        assert_eq!(summary.throughput, 2.0);
    }

    #[test]
    fn run_summary_handles_zero_duration() {
        let summary = RunSummary::new(10, 0.0);
        assert_eq!(summary.throughput, 0.0);
    }
}
