use async_trait::async_trait;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use core_types::{Observation, Provider, TimeRange};
use database::connection::{connect, run_migrations};
use database::repository::ObservationRepository;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{error::OrchestratorError, BenchmarkOrchestrator, ObservationSink};
use std::net::SocketAddr;
use std::sync::Arc;

/// The main entry point for the Pulse provider-benchmark application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = configuration::load_config()?;

    match cli.command {
        Commands::Serve(args) => {
            web_server::run_server(args.addr, config).await?;
        }
        Commands::BenchPrice(args) => {
            handle_price_benchmark(args, config).await?;
        }
        Commands::BenchWallet(args) => {
            handle_wallet_benchmark(args, config).await?;
        }
        Commands::Summary(args) => {
            handle_summary(args).await?;
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Benchmarks crypto data-provider APIs and reports comparative statistics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ServeArgs),
    /// Run a price benchmark against all configured providers.
    BenchPrice(BenchPriceArgs),
    /// Run a wallet-balance benchmark against all configured providers.
    BenchWallet(BenchWalletArgs),
    /// Print per-provider summary statistics for a lookback window.
    Summary(SummaryArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,
}

#[derive(Parser)]
struct BenchPriceArgs {
    /// Token symbols to probe (e.g. "USDT,ETH").
    #[arg(long, value_delimiter = ',', default_values_t = ["USDT".to_string(), "ETH".to_string()])]
    symbols: Vec<String>,

    /// Probes per symbol per provider. Defaults to the configured value.
    #[arg(long)]
    iterations: Option<u32>,
}

#[derive(Parser)]
struct BenchWalletArgs {
    /// The wallet address whose holdings every provider is asked for.
    #[arg(long)]
    address: String,

    /// Probes per provider. Defaults to the configured value.
    #[arg(long)]
    iterations: Option<u32>,
}

#[derive(Parser)]
struct SummaryArgs {
    /// Lookback window: 1h, 6h, 24h or 7d.
    #[arg(long, default_value = "24h")]
    range: TimeRange,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// A sink decorator that advances a progress bar as observations stream out
/// of an in-flight run, on their way to the database.
struct ProgressSink {
    inner: ObservationRepository,
    bar: ProgressBar,
}

#[async_trait]
impl ObservationSink for ProgressSink {
    async fn record(&self, observation: &Observation) -> Result<(), OrchestratorError> {
        self.inner.save_observation(observation).await?;
        self.bar.inc(1);
        self.bar.set_message(format!(
            "{} {} ({})",
            observation.provider, observation.test_type, observation.error_kind
        ));
        Ok(())
    }
}

fn progress_bar(total: u64) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

async fn repository() -> anyhow::Result<ObservationRepository> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    Ok(ObservationRepository::new(db_pool))
}

/// Handles the orchestration of a CLI-triggered price benchmark.
async fn handle_price_benchmark(
    args: BenchPriceArgs,
    config: configuration::Config,
) -> anyhow::Result<()> {
    let repo = repository().await?;
    let iterations = args
        .iterations
        .unwrap_or(config.benchmark.default_iterations);

    // Build the orchestrator twice: once to size the progress bar, then
    // with the progress-reporting sink wired in.
    let planned = BenchmarkOrchestrator::from_config(&config, Arc::new(repo.clone()))?
        .planned_requests(args.symbols.len(), iterations);
    let bar = progress_bar(planned)?;

    let sink = Arc::new(ProgressSink {
        inner: repo,
        bar: bar.clone(),
    });
    let orchestrator = BenchmarkOrchestrator::from_config(&config, sink)?;
    let summary = orchestrator
        .run_price_benchmark(&args.symbols, iterations)
        .await?;

    bar.finish_with_message("Benchmark complete");
    println!(
        "Ran {} probes in {:.1}s ({:.2} req/s)",
        summary.total_requests, summary.duration_seconds, summary.throughput
    );
    Ok(())
}

/// Handles the orchestration of a CLI-triggered wallet benchmark.
async fn handle_wallet_benchmark(
    args: BenchWalletArgs,
    config: configuration::Config,
) -> anyhow::Result<()> {
    if args.address.trim().is_empty() {
        anyhow::bail!("a wallet address is required");
    }
    let repo = repository().await?;
    let iterations = args
        .iterations
        .unwrap_or(config.benchmark.default_iterations);

    let planned = BenchmarkOrchestrator::from_config(&config, Arc::new(repo.clone()))?
        .planned_requests(1, iterations);
    let bar = progress_bar(planned)?;

    let sink = Arc::new(ProgressSink {
        inner: repo,
        bar: bar.clone(),
    });
    let orchestrator = BenchmarkOrchestrator::from_config(&config, sink)?;
    let summary = orchestrator
        .run_wallet_benchmark(args.address.trim(), iterations)
        .await?;

    bar.finish_with_message("Benchmark complete");
    println!(
        "Ran {} probes in {:.1}s ({:.2} req/s)",
        summary.total_requests, summary.duration_seconds, summary.throughput
    );
    Ok(())
}

/// Prints the per-provider summary table for the requested window.
async fn handle_summary(args: SummaryArgs) -> anyhow::Result<()> {
    let repo = repository().await?;
    let observations = repo.get_observations_since(args.range.hours()).await?;
    let summaries = metrics::summarize(&observations, Provider::benchmarked());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Provider",
        "Requests",
        "Failed",
        "Success %",
        "Avg ms",
        "p50 ms",
        "p95 ms",
        "Accuracy %",
        "Avg |dev| %",
    ]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(summary.provider.as_str()),
            Cell::new(summary.requests),
            Cell::new(summary.failed),
            Cell::new(format!("{:.1}", summary.success_rate)),
            Cell::new(format!("{:.1}", summary.avg_latency)),
            Cell::new(format!("{:.1}", summary.p50_latency)),
            Cell::new(format!("{:.1}", summary.p95_latency)),
            Cell::new(format!("{:.1}", summary.accuracy_rate)),
            Cell::new(format!("{:.2}", summary.avg_deviation)),
        ]);
    }

    println!("Summary over the last {}:", args.range.as_str());
    println!("{table}");
    Ok(())
}
