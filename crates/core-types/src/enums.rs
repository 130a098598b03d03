use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The closed set of data providers the engine knows how to probe.
///
/// Coingecko is the reference/oracle provider: its prices seed the
/// `reference_value` used to judge the accuracy of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Alchemy,
    Mobula,
    Codex,
    Coingecko,
}

impl Provider {
    /// All providers, reference included.
    pub fn all() -> &'static [Provider] {
        &[
            Provider::Alchemy,
            Provider::Mobula,
            Provider::Codex,
            Provider::Coingecko,
        ]
    }

    /// The providers that get benchmarked (everything except the oracle).
    pub fn benchmarked() -> &'static [Provider] {
        &[Provider::Alchemy, Provider::Mobula, Provider::Codex]
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Provider::Coingecko)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Alchemy => "alchemy",
            Provider::Mobula => "mobula",
            Provider::Codex => "codex",
            Provider::Coingecko => "coingecko",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alchemy" => Ok(Provider::Alchemy),
            "mobula" => Ok(Provider::Mobula),
            "codex" => Ok(Provider::Codex),
            "coingecko" => Ok(Provider::Coingecko),
            other => Err(CoreError::UnknownVariant("provider", other.to_string())),
        }
    }
}

/// Canonical classification of a probe outcome. `Success` if and only if the
/// observation's `success` flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Success,
    RateLimit,
    AuthError,
    NotFound,
    ServerError,
    NetworkError,
    ParseError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Success => "success",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::AuthError => "auth_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::UnknownError => "unknown_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ErrorKind::Success),
            "rate_limit" => Ok(ErrorKind::RateLimit),
            "auth_error" => Ok(ErrorKind::AuthError),
            "not_found" => Ok(ErrorKind::NotFound),
            "server_error" => Ok(ErrorKind::ServerError),
            "network_error" => Ok(ErrorKind::NetworkError),
            "parse_error" => Ok(ErrorKind::ParseError),
            "unknown_error" => Ok(ErrorKind::UnknownError),
            other => Err(CoreError::UnknownVariant("error kind", other.to_string())),
        }
    }
}

/// Lookback windows recognized by the read queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "7d")]
    SevenDays,
}

impl TimeRange {
    /// The lookback window in whole hours.
    pub fn hours(&self) -> i64 {
        match self {
            TimeRange::OneHour => 1,
            TimeRange::SixHours => 6,
            TimeRange::OneDay => 24,
            TimeRange::SevenDays => 168,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::OneDay => "24h",
            TimeRange::SevenDays => "7d",
        }
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeRange::OneHour),
            "6h" => Ok(TimeRange::SixHours),
            "24h" => Ok(TimeRange::OneDay),
            "7d" => Ok(TimeRange::SevenDays),
            other => Err(CoreError::UnknownVariant("time range", other.to_string())),
        }
    }
}

/// The metrics the time-series bucketizer can compute for graph queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphMetric {
    AvgLatency,
    P95Latency,
    SuccessRate,
    AccuracyRate,
    FailedRequests,
    Throughput,
}

impl GraphMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphMetric::AvgLatency => "avg-latency",
            GraphMetric::P95Latency => "p95-latency",
            GraphMetric::SuccessRate => "success-rate",
            GraphMetric::AccuracyRate => "accuracy-rate",
            GraphMetric::FailedRequests => "failed-requests",
            GraphMetric::Throughput => "throughput",
        }
    }
}

impl FromStr for GraphMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg-latency" => Ok(GraphMetric::AvgLatency),
            "p95-latency" => Ok(GraphMetric::P95Latency),
            "success-rate" => Ok(GraphMetric::SuccessRate),
            "accuracy-rate" => Ok(GraphMetric::AccuracyRate),
            "failed-requests" => Ok(GraphMetric::FailedRequests),
            "throughput" => Ok(GraphMetric::Throughput),
            other => Err(CoreError::UnknownVariant("graph metric", other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_strings() {
        for provider in Provider::all() {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), *provider);
        }
    }

    #[test]
    fn benchmarked_set_excludes_the_oracle() {
        assert!(!Provider::benchmarked().contains(&Provider::Coingecko));
        assert!(Provider::Coingecko.is_reference());
    }

    #[test]
    fn time_ranges_map_to_lookback_hours() {
        assert_eq!("1h".parse::<TimeRange>().unwrap().hours(), 1);
        assert_eq!("6h".parse::<TimeRange>().unwrap().hours(), 6);
        assert_eq!("24h".parse::<TimeRange>().unwrap().hours(), 24);
        assert_eq!("7d".parse::<TimeRange>().unwrap().hours(), 168);
        assert!("3d".parse::<TimeRange>().is_err());
    }

    #[test]
    fn graph_metric_parses_kebab_case() {
        assert_eq!(
            "p95-latency".parse::<GraphMetric>().unwrap(),
            GraphMetric::P95Latency
        );
        assert!("median-latency".parse::<GraphMetric>().is_err());
    }
}
