use crate::{error::AppError, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use core_types::{GraphMetric, Provider, RunSummary, TimeRange};
use metrics::{BucketResult, ErrorBreakdown, ProviderSummary, VariancePoint};
use orchestrator::BenchmarkOrchestrator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    range: Option<String>,
}

impl RangeQuery {
    /// Parses the requested lookback window, defaulting to 24h.
    fn time_range(&self) -> Result<TimeRange, AppError> {
        match &self.range {
            None => Ok(TimeRange::OneDay),
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::InvalidParameter(format!("unknown time range '{raw}'"))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQuery {
    metric: String,
    range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriceBenchmarkRequest {
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    #[serde(default)]
    pub iterations: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WalletBenchmarkRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub iterations: Option<u32>,
}

/// Per-provider accuracy figures plus the cross-provider variance series.
#[derive(Debug, Serialize)]
pub struct AccuracyComparison {
    pub providers: Vec<ProviderAccuracy>,
    pub variance: Vec<VariancePoint>,
}

#[derive(Debug, Serialize)]
pub struct ProviderAccuracy {
    pub provider: Provider,
    pub samples: u64,
    pub accuracy_rate: f64,
    pub avg_deviation: f64,
}

#[derive(Debug, Serialize)]
pub struct GraphResponse {
    pub metric: GraphMetric,
    pub range: TimeRange,
    pub buckets: Vec<BucketResult>,
}

#[derive(Debug, Serialize)]
pub struct ErrorsResponse {
    pub range: TimeRange,
    pub since: DateTime<Utc>,
    pub providers: Vec<ErrorBreakdown>,
}

/// # POST /api/benchmark/price
/// Triggers a price benchmark run and blocks until it completes.
pub async fn run_price_benchmark(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PriceBenchmarkRequest>,
) -> Result<Json<RunSummary>, AppError> {
    let symbols = request
        .symbols
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| vec!["USDT".to_string(), "ETH".to_string()]);
    let iterations = request
        .iterations
        .unwrap_or(state.config.benchmark.default_iterations);

    let sink = Arc::new(state.repo.clone());
    let orchestrator = BenchmarkOrchestrator::from_config(&state.config, sink)?;
    let summary = orchestrator.run_price_benchmark(&symbols, iterations).await?;
    Ok(Json(summary))
}

/// # POST /api/benchmark/wallet
/// Triggers a wallet benchmark run. A missing address is a caller error,
/// rejected here before the engine is involved.
pub async fn run_wallet_benchmark(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WalletBenchmarkRequest>,
) -> Result<Json<RunSummary>, AppError> {
    if request.address.trim().is_empty() {
        return Err(AppError::Validation(
            "a wallet address is required".to_string(),
        ));
    }
    let iterations = request
        .iterations
        .unwrap_or(state.config.benchmark.default_iterations);

    let sink = Arc::new(state.repo.clone());
    let orchestrator = BenchmarkOrchestrator::from_config(&state.config, sink)?;
    let summary = orchestrator
        .run_wallet_benchmark(request.address.trim(), iterations)
        .await?;
    Ok(Json(summary))
}

/// # GET /api/summary?range=24h
/// Per-provider summary statistics over the lookback window.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<ProviderSummary>>, AppError> {
    let range = query.time_range()?;
    let observations = state.repo.get_observations_since(range.hours()).await?;
    let summaries = metrics::summarize(&observations, Provider::benchmarked());
    Ok(Json(summaries))
}

/// # GET /api/accuracy?range=24h
/// Accuracy comparison across providers, including the per-bucket
/// cross-provider variance series.
pub async fn get_accuracy_comparison(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AccuracyComparison>, AppError> {
    let range = query.time_range()?;
    let observations = state
        .repo
        .get_price_observations_since(range.hours())
        .await?;

    let providers = metrics::summarize(&observations, Provider::benchmarked())
        .into_iter()
        .map(|summary| ProviderAccuracy {
            provider: summary.provider,
            samples: summary.requests,
            accuracy_rate: summary.accuracy_rate,
            avg_deviation: summary.avg_deviation,
        })
        .collect();

    let variance = metrics::variance_series(
        &observations,
        metrics::DEFAULT_BUCKET_WIDTH_MINUTES,
        Provider::Coingecko,
    );

    Ok(Json(AccuracyComparison { providers, variance }))
}

/// # GET /api/errors?range=24h
/// Failure counts per provider per canonical error kind.
pub async fn get_error_breakdown(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ErrorsResponse>, AppError> {
    let range = query.time_range()?;
    let observations = state.repo.get_observations_since(range.hours()).await?;
    let providers = metrics::error_breakdown(&observations, Provider::benchmarked());
    Ok(Json(ErrorsResponse {
        range,
        since: Utc::now() - chrono::Duration::hours(range.hours()),
        providers,
    }))
}

/// # GET /api/graph?metric=avg-latency&range=6h
/// A bucketized time series of the requested metric, one value per provider
/// per bucket. Providers without data in a bucket are `null`, not zero.
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GraphQuery>,
) -> Result<Json<GraphResponse>, AppError> {
    let metric: GraphMetric = query
        .metric
        .parse()
        .map_err(|_| AppError::InvalidParameter(format!("unknown metric '{}'", query.metric)))?;
    let range = RangeQuery {
        range: query.range.clone(),
    }
    .time_range()?;

    let observations = state.repo.get_observations_since(range.hours()).await?;
    let buckets = metrics::bucketize(
        &observations,
        metrics::DEFAULT_BUCKET_WIDTH_MINUTES,
        metric,
        Provider::benchmarked(),
    );

    Ok(Json(GraphResponse {
        metric,
        range,
        buckets,
    }))
}
