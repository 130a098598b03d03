use core_types::Provider;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so the application starts without a
/// `config.toml` at all. With no provider sections configured, read-only
/// commands still work and benchmark runs fail with a clear error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
}

/// Credential and endpoint configuration for every known provider.
///
/// A provider section left out of `config.toml` (or with an empty api_key)
/// is skipped by benchmark runs rather than probed with bad credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub alchemy: Option<ProviderCredentials>,
    pub mobula: Option<ProviderCredentials>,
    pub codex: Option<ProviderCredentials>,
    pub coingecko: Option<ProviderCredentials>,
}

impl ProvidersConfig {
    /// Looks up the credentials for one provider, if configured.
    pub fn get(&self, provider: Provider) -> Option<&ProviderCredentials> {
        let creds = match provider {
            Provider::Alchemy => self.alchemy.as_ref(),
            Provider::Mobula => self.mobula.as_ref(),
            Provider::Codex => self.codex.as_ref(),
            Provider::Coingecko => self.coingecko.as_ref(),
        };
        creds.filter(|c| !c.api_key.is_empty() || provider == Provider::Coingecko)
    }
}

/// Connection details for a single provider API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    /// The API key. Coingecko's public endpoint works without one, so an
    /// empty string is acceptable there.
    #[serde(default)]
    pub api_key: String,
    /// Overrides the provider's default base URL. Mainly useful for pointing
    /// tests at a local mock server.
    pub base_url: Option<String>,
}

/// Tuning knobs for the benchmark orchestrator and accuracy validation.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    /// Relative accuracy tolerance as a fraction (0.05 = 5%). An observed
    /// price within this distance of the reference counts as accurate.
    #[serde(default = "default_tolerance")]
    pub accuracy_tolerance: f64,

    /// Cooperative delay between successive price-test calls to the same
    /// provider, to stay under externally-imposed rate limits.
    #[serde(default = "default_price_pacing_ms")]
    pub price_pacing_ms: u64,

    /// Delay between successive wallet-test calls to the same provider.
    /// Wallet endpoints are heavier, so the default is more conservative.
    #[serde(default = "default_wallet_pacing_ms")]
    pub wallet_pacing_ms: u64,

    /// Per-call network timeout. A call exceeding this is recorded as a
    /// failed observation classified `network_error`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Iterations per subject when the caller does not specify one.
    #[serde(default = "default_iterations")]
    pub default_iterations: u32,
}

fn default_tolerance() -> f64 {
    0.05
}
fn default_price_pacing_ms() -> u64 {
    100
}
fn default_wallet_pacing_ms() -> u64 {
    200
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_iterations() -> u32 {
    5
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            accuracy_tolerance: default_tolerance(),
            price_pacing_ms: default_price_pacing_ms(),
            wallet_pacing_ms: default_wallet_pacing_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            default_iterations: default_iterations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_section_is_skipped() {
        let providers = ProvidersConfig {
            alchemy: Some(ProviderCredentials {
                api_key: "key".to_string(),
                base_url: None,
            }),
            mobula: None,
            codex: Some(ProviderCredentials {
                api_key: String::new(),
                base_url: None,
            }),
            coingecko: Some(ProviderCredentials {
                api_key: String::new(),
                base_url: None,
            }),
        };

        assert!(providers.get(Provider::Alchemy).is_some());
        assert!(providers.get(Provider::Mobula).is_none());
        // An empty key means "not configured" for benchmarked providers...
        assert!(providers.get(Provider::Codex).is_none());
        // ...but the coingecko public endpoint needs no key at all.
        assert!(providers.get(Provider::Coingecko).is_some());
    }

    #[test]
    fn benchmark_defaults_match_documented_pacing() {
        let benchmark = BenchmarkConfig::default();
        assert_eq!(benchmark.accuracy_tolerance, 0.05);
        assert_eq!(benchmark.price_pacing_ms, 100);
        assert_eq!(benchmark.wallet_pacing_ms, 200);
        assert_eq!(benchmark.default_iterations, 5);
    }
}
