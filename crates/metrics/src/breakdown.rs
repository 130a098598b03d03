use core_types::{ErrorKind, Observation, Provider};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-provider failure counts keyed by canonical error kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBreakdown {
    pub provider: Provider,
    pub total_failed: u64,
    pub counts: HashMap<ErrorKind, u64>,
}

/// Counts failed observations per provider per error kind. Successful
/// observations are excluded; a provider with no failures gets an empty map
/// rather than being dropped, so the caller always sees every provider.
pub fn error_breakdown(observations: &[Observation], providers: &[Provider]) -> Vec<ErrorBreakdown> {
    providers
        .iter()
        .map(|&provider| {
            let mut counts: HashMap<ErrorKind, u64> = HashMap::new();
            for observation in observations
                .iter()
                .filter(|o| o.provider == provider && !o.success)
            {
                *counts.entry(observation.error_kind).or_insert(0) += 1;
            }
            ErrorBreakdown {
                provider,
                total_failed: counts.values().sum(),
                counts,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn failed(provider: Provider, kind: ErrorKind) -> Observation {
        Observation {
            provider,
            test_type: "price_USDT".to_string(),
            latency_ms: 10.0,
            success: false,
            error_kind: kind,
            observed_value: None,
            reference_value: None,
            is_accurate: None,
            deviation_pct: None,
            response_size_bytes: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn failures_are_counted_per_kind() {
        let observations = vec![
            failed(Provider::Alchemy, ErrorKind::RateLimit),
            failed(Provider::Alchemy, ErrorKind::RateLimit),
            failed(Provider::Alchemy, ErrorKind::ServerError),
            failed(Provider::Mobula, ErrorKind::AuthError),
        ];

        let breakdown = error_breakdown(&observations, Provider::benchmarked());

        let alchemy = &breakdown[0];
        assert_eq!(alchemy.total_failed, 3);
        assert_eq!(alchemy.counts[&ErrorKind::RateLimit], 2);
        assert_eq!(alchemy.counts[&ErrorKind::ServerError], 1);

        let codex = &breakdown[2];
        assert_eq!(codex.total_failed, 0);
        assert!(codex.counts.is_empty());
    }

    #[test]
    fn successes_do_not_appear_in_the_breakdown() {
        let mut ok = failed(Provider::Codex, ErrorKind::Success);
        ok.success = true;
        let breakdown = error_breakdown(&[ok], &[Provider::Codex]);
        assert_eq!(breakdown[0].total_failed, 0);
    }
}
