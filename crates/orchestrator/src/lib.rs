use crate::error::OrchestratorError;
use async_trait::async_trait;
use configuration::{BenchmarkConfig, Config};
use core_types::{Observation, Provider, RunSummary};
use database::ObservationRepository;
use probes::clients::build_client;
use probes::{probe_price, probe_wallet_balance, ProviderClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod error;

/// Where observations go as they are produced. Each probe's observation is
/// streamed out immediately rather than buffered for the whole run, so a
/// crashed run still leaves everything it measured behind.
#[async_trait]
pub trait ObservationSink: Send + Sync {
    async fn record(&self, observation: &Observation) -> Result<(), OrchestratorError>;
}

#[async_trait]
impl ObservationSink for ObservationRepository {
    async fn record(&self, observation: &Observation) -> Result<(), OrchestratorError> {
        self.save_observation(observation).await?;
        Ok(())
    }
}

/// The central orchestrator for benchmark runs.
///
/// Drives probes strictly sequentially: for each subject and iteration, the
/// reference provider is probed first (its price seeds `reference_value` for
/// every peer in that iteration, keeping comparisons time-aligned), then
/// each benchmarked provider in turn. A cooperative pacing delay separates
/// successive calls to the same provider. Failed probes are recorded and the
/// run continues; nothing is retried.
pub struct BenchmarkOrchestrator {
    benchmark: BenchmarkConfig,
    clients: Vec<Arc<dyn ProviderClient>>,
    reference: Option<Arc<dyn ProviderClient>>,
    sink: Arc<dyn ObservationSink>,
}

impl BenchmarkOrchestrator {
    /// Creates an orchestrator over explicit collaborators. Useful for tests
    /// and for callers that build their own clients.
    pub fn new(
        benchmark: BenchmarkConfig,
        clients: Vec<Arc<dyn ProviderClient>>,
        reference: Option<Arc<dyn ProviderClient>>,
        sink: Arc<dyn ObservationSink>,
    ) -> Self {
        Self {
            benchmark,
            clients,
            reference,
            sink,
        }
    }

    /// Builds an orchestrator from configuration: one client per benchmarked
    /// provider with credentials, plus the reference client if configured.
    /// Configuration is passed in explicitly so test and production setups
    /// can coexist.
    pub fn from_config(
        config: &Config,
        sink: Arc<dyn ObservationSink>,
    ) -> Result<Self, OrchestratorError> {
        let timeout = Duration::from_secs(config.benchmark.request_timeout_secs);

        let mut clients = Vec::new();
        for &provider in Provider::benchmarked() {
            match config.providers.get(provider) {
                Some(credentials) => {
                    clients.push(build_client(provider, credentials, timeout)?);
                }
                None => warn!(%provider, "Provider has no credentials configured; skipping"),
            }
        }
        if clients.is_empty() {
            return Err(OrchestratorError::NoProviders);
        }

        let reference = config
            .providers
            .get(Provider::Coingecko)
            .map(|credentials| build_client(Provider::Coingecko, credentials, timeout))
            .transpose()?;

        Ok(Self::new(config.benchmark.clone(), clients, reference, sink))
    }

    /// Total probes a run will issue, reference captures included. Exposed
    /// so callers can size progress reporting.
    pub fn planned_requests(&self, subjects: usize, iterations: u32) -> u64 {
        let per_iteration = self.clients.len() as u64 + u64::from(self.reference.is_some());
        per_iteration * subjects as u64 * u64::from(iterations)
    }

    /// Runs the price benchmark: `symbols × iterations` sweeps over every
    /// configured provider, each probe emitting one observation to the sink.
    pub async fn run_price_benchmark(
        &self,
        symbols: &[String],
        iterations: u32,
    ) -> Result<RunSummary, OrchestratorError> {
        info!(
            symbols = ?symbols,
            iterations,
            providers = self.clients.len(),
            "Starting price benchmark run"
        );
        let start = Instant::now();
        let pacing = Duration::from_millis(self.benchmark.price_pacing_ms);
        let mut total_requests = 0u64;

        for (subject_index, symbol) in symbols.iter().enumerate() {
            for iteration in 0..iterations {
                // Capture the oracle price once per iteration so every
                // provider in this sweep is judged against the same value.
                let mut reference_value = None;
                if let Some(reference) = &self.reference {
                    let observation = probe_price(
                        reference.as_ref(),
                        symbol,
                        None,
                        self.benchmark.accuracy_tolerance,
                    )
                    .await;
                    reference_value = observation.observed_value;
                    total_requests += 1;
                    self.sink.record(&observation).await?;
                }

                for client in &self.clients {
                    let observation = probe_price(
                        client.as_ref(),
                        symbol,
                        reference_value,
                        self.benchmark.accuracy_tolerance,
                    )
                    .await;
                    if !observation.success {
                        warn!(
                            provider = %observation.provider,
                            error_kind = %observation.error_kind,
                            "Price probe failed; continuing run"
                        );
                    }
                    total_requests += 1;
                    self.sink.record(&observation).await?;
                }

                // Pacing between successive calls to the same provider.
                // The per-iteration sweep visits each provider once, so one
                // delay after every sweep (including across subject
                // boundaries) spaces every provider's call sequence. Only
                // the run's final sweep skips it.
                let last_sweep =
                    subject_index + 1 == symbols.len() && iteration + 1 == iterations;
                if !last_sweep {
                    tokio::time::sleep(pacing).await;
                }
            }
        }

        let summary = RunSummary::new(total_requests, start.elapsed().as_secs_f64());
        info!(
            total_requests = summary.total_requests,
            duration_seconds = summary.duration_seconds,
            throughput = summary.throughput,
            "Price benchmark run complete"
        );
        Ok(summary)
    }

    /// Runs the wallet benchmark against one address. Wallet probes have no
    /// oracle, so observations carry no accuracy verdict.
    pub async fn run_wallet_benchmark(
        &self,
        address: &str,
        iterations: u32,
    ) -> Result<RunSummary, OrchestratorError> {
        info!(
            address,
            iterations,
            providers = self.clients.len(),
            "Starting wallet benchmark run"
        );
        let start = Instant::now();
        let pacing = Duration::from_millis(self.benchmark.wallet_pacing_ms);
        let mut total_requests = 0u64;

        for iteration in 0..iterations {
            for client in &self.clients {
                let observation = probe_wallet_balance(client.as_ref(), address).await;
                if !observation.success {
                    warn!(
                        provider = %observation.provider,
                        error_kind = %observation.error_kind,
                        "Wallet probe failed; continuing run"
                    );
                }
                total_requests += 1;
                self.sink.record(&observation).await?;
            }

            if iteration + 1 < iterations {
                tokio::time::sleep(pacing).await;
            }
        }

        let summary = RunSummary::new(total_requests, start.elapsed().as_secs_f64());
        info!(
            total_requests = summary.total_requests,
            duration_seconds = summary.duration_seconds,
            "Wallet benchmark run complete"
        );
        Ok(summary)
    }
}
