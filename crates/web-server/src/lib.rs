use axum::{
    routing::{get, post},
    Router,
};
use configuration::Config;
use database::ObservationRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: ObservationRepository,
    pub config: Config,
}

/// The main function to configure and run the web server.
///
/// Tracing is initialized by the binary, not here, so a single subscriber
/// covers the whole process.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let repo = ObservationRepository::new(db_pool);

    let app_state = Arc::new(AppState { repo, config });
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/benchmark/price", post(handlers::run_price_benchmark))
        .route("/api/benchmark/wallet", post(handlers::run_wallet_benchmark))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/accuracy", get(handlers::get_accuracy_comparison))
        .route("/api/errors", get(handlers::get_error_breakdown))
        .route("/api/graph", get(handlers::get_graph))
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every
        // incoming request.
        .layer(TraceLayer::new_for_http());

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
