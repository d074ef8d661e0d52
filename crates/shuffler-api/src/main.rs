//! Prize shuffler API server entry point.

use std::sync::Arc;

use axum::Router;
use shuffler_api::config::ServerConfig;
use shuffler_api::error::AppError;
use shuffler_api::routes;
use shuffler_api::sink::LogResultsSink;
use shuffler_api::state::AppState;
use shuffler_core::clock::SystemClock;
use shuffler_core::rng::SystemRng;
use shuffler_engine::application::service::EngineService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting prize shuffler API server");

    // Read configuration from environment.
    let config = ServerConfig::from_env()?;
    tracing::info!(pool = ?config.engine.initial_pool, guard = ?config.engine.guard, "engine configured");

    // Start the engine.
    let engine = Arc::new(EngineService::spawn(
        config.engine.clone(),
        Arc::new(SystemClock),
        Box::new(SystemRng::from_entropy()),
        Arc::new(LogResultsSink),
    )?);
    let app_state = AppState::new(Arc::clone(&engine));

    // Build router.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/shuffler", routes::shuffler::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown();
    tracing::info!("Prize shuffler API server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
