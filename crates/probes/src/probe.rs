use crate::classifier::classify;
use crate::error::ProbeError;
use crate::extractor::{extract_price, extract_wallet_balance};
use crate::validator::verdict;
use crate::{ProviderClient, RawResponse};
use chrono::Utc;
use core_types::{ErrorKind, Observation, Provider};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

/// Runs one timed price probe against one provider and resolves it to an
/// `Observation`. Never propagates an error past this boundary: every
/// outcome, including transport failures, becomes a valid observation.
///
/// When a `reference_value` is supplied and extraction succeeds, the
/// observation carries an accuracy verdict and signed deviation.
pub async fn probe_price(
    client: &dyn ProviderClient,
    symbol: &str,
    reference_value: Option<f64>,
    tolerance: f64,
) -> Observation {
    let provider = client.provider();
    let test_type = format!("price_{symbol}");

    let start = Instant::now();
    let result = client.fetch_price(symbol).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    build_observation(
        provider,
        test_type,
        latency_ms,
        result,
        reference_value,
        tolerance,
        extract_price,
    )
}

/// Runs one timed wallet-holdings probe. The observed value is a
/// balance-presence indicator (token entry count); wallet probes carry no
/// accuracy verdict because there is no oracle for holdings.
pub async fn probe_wallet_balance(client: &dyn ProviderClient, address: &str) -> Observation {
    let provider = client.provider();

    let start = Instant::now();
    let result = client.fetch_wallet_balance(address).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    build_observation(
        provider,
        "wallet_balance".to_string(),
        latency_ms,
        result,
        None,
        0.0,
        extract_wallet_balance,
    )
}

/// Resolves the raw outcome of one call into the canonical observation.
/// Classification order: transport error, non-2xx status, provider-reported
/// in-body error, unparseable body. Anything left is a successful call, and
/// a missing extraction path is a normal absent value rather than a failure.
fn build_observation(
    provider: Provider,
    test_type: String,
    latency_ms: f64,
    result: Result<RawResponse, ProbeError>,
    reference_value: Option<f64>,
    tolerance: f64,
    extract: fn(Provider, &Value) -> Option<f64>,
) -> Observation {
    let mut observation = Observation {
        provider,
        test_type,
        latency_ms,
        success: false,
        error_kind: ErrorKind::UnknownError,
        observed_value: None,
        reference_value,
        is_accurate: None,
        deviation_pct: None,
        response_size_bytes: 0,
        timestamp: Utc::now(),
    };

    let raw = match result {
        Ok(raw) => raw,
        Err(error) => {
            let text = failure_text(&error);
            observation.error_kind = classify(Some(&text), None);
            debug!(%provider, error = %text, "Probe transport failure");
            return observation;
        }
    };

    observation.response_size_bytes = raw.body.len() as i64;
    let parsed: Result<Value, _> = serde_json::from_str(&raw.body);

    if !raw.is_success_status() {
        observation.error_kind = classify(Some(&raw.body), Some(raw.status));
        return observation;
    }

    let json = match parsed {
        Ok(json) => json,
        Err(error) => {
            observation.error_kind =
                classify(Some(&format!("malformed response body: {error}")), None);
            return observation;
        }
    };

    // Some providers report failures in-body under HTTP 200.
    if let Some(error_field) = json.get("error") {
        let text = match error_field {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        observation.error_kind = classify(Some(&text), Some(raw.status));
        return observation;
    }

    observation.success = true;
    observation.error_kind = ErrorKind::Success;
    observation.observed_value = extract(provider, &json);

    if let (Some(observed), Some(reference)) = (observation.observed_value, reference_value) {
        if let Some((is_accurate, deviation)) = verdict(observed, reference, tolerance) {
            observation.is_accurate = Some(is_accurate);
            observation.deviation_pct = Some(deviation);
        }
    }

    observation
}

/// Flattens a probe error into classifiable text, surfacing timeout and
/// connection failures explicitly so they land in `network_error`.
fn failure_text(error: &ProbeError) -> String {
    match error {
        ProbeError::Request(e) if e.is_timeout() => format!("timeout: {e}"),
        ProbeError::Request(e) if e.is_connect() => format!("connect error: {e}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// A stub client that replays a canned outcome for every call.
    struct StubClient {
        provider: Provider,
        status: u16,
        body: String,
    }

    impl StubClient {
        fn new(provider: Provider, status: u16, body: &str) -> Self {
            Self {
                provider,
                status,
                body: body.to_string(),
            }
        }
    }

    #[async_trait]
    impl ProviderClient for StubClient {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<RawResponse, ProbeError> {
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }

        async fn fetch_wallet_balance(&self, _address: &str) -> Result<RawResponse, ProbeError> {
            Ok(RawResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    #[tokio::test]
    async fn successful_probe_extracts_and_validates() {
        let body = r#"{"data":{"price":1.03}}"#;
        let client = StubClient::new(Provider::Mobula, 200, body);

        let obs = probe_price(&client, "USDT", Some(1.00), 0.05).await;

        assert!(obs.success);
        assert_eq!(obs.error_kind, ErrorKind::Success);
        assert_eq!(obs.test_type, "price_USDT");
        assert_eq!(obs.observed_value, Some(1.03));
        assert_eq!(obs.reference_value, Some(1.00));
        assert_eq!(obs.is_accurate, Some(true));
        assert!((obs.deviation_pct.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(obs.response_size_bytes, body.len() as i64);
        assert!(obs.latency_ms >= 0.0);
    }

    #[tokio::test]
    async fn out_of_tolerance_price_is_inaccurate_but_successful() {
        let client = StubClient::new(Provider::Mobula, 200, r#"{"data":{"price":1.07}}"#);

        let obs = probe_price(&client, "USDT", Some(1.00), 0.05).await;

        assert!(obs.success);
        assert_eq!(obs.is_accurate, Some(false));
        assert!(obs.deviation_pct.is_some());
    }

    #[tokio::test]
    async fn missing_reference_leaves_no_verdict() {
        let client = StubClient::new(Provider::Mobula, 200, r#"{"data":{"price":1.0}}"#);

        let obs = probe_price(&client, "USDT", None, 0.05).await;

        assert_eq!(obs.is_accurate, None);
        assert_eq!(obs.deviation_pct, None);
    }

    #[tokio::test]
    async fn rate_limited_status_records_a_failed_observation() {
        let body = r#"{"message":"Too Many Requests"}"#;
        let client = StubClient::new(Provider::Alchemy, 429, body);

        let obs = probe_price(&client, "ETH", Some(1800.0), 0.05).await;

        assert!(!obs.success);
        assert_eq!(obs.error_kind, ErrorKind::RateLimit);
        assert_eq!(obs.observed_value, None);
        assert_eq!(obs.is_accurate, None);
        // The body still counts toward response size on failures.
        assert_eq!(obs.response_size_bytes, body.len() as i64);
    }

    #[tokio::test]
    async fn in_body_error_field_fails_the_probe_despite_http_200() {
        let client = StubClient::new(
            Provider::Codex,
            200,
            r#"{"error":"unauthorized: bad api key"}"#,
        );

        let obs = probe_price(&client, "USDT", None, 0.05).await;

        assert!(!obs.success);
        assert_eq!(obs.error_kind, ErrorKind::AuthError);
    }

    #[tokio::test]
    async fn unparseable_body_is_a_parse_error() {
        let client = StubClient::new(Provider::Mobula, 200, "<html>gateway</html>");

        let obs = probe_price(&client, "USDT", None, 0.05).await;

        assert!(!obs.success);
        assert_eq!(obs.error_kind, ErrorKind::ParseError);
        assert!(obs.response_size_bytes > 0);
    }

    #[tokio::test]
    async fn missing_extraction_path_is_not_a_failure() {
        let client = StubClient::new(Provider::Mobula, 200, r#"{"data":{"volume":5}}"#);

        let obs = probe_price(&client, "USDT", Some(1.0), 0.05).await;

        assert!(obs.success);
        assert_eq!(obs.error_kind, ErrorKind::Success);
        assert_eq!(obs.observed_value, None);
        assert_eq!(obs.is_accurate, None);
    }

    #[tokio::test]
    async fn wallet_probe_counts_tokens() {
        let client = StubClient::new(
            Provider::Alchemy,
            200,
            r#"{"result":{"tokenBalances":[{},{}]}}"#,
        );

        let obs = probe_wallet_balance(&client, "0xabc").await;

        assert!(obs.success);
        assert_eq!(obs.test_type, "wallet_balance");
        assert_eq!(obs.observed_value, Some(2.0));
        assert_eq!(obs.is_accurate, None);
    }
}
