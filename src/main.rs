use anyhow::Context;
use ip_lookup::api::ratelimit::RateLimiter;
use ip_lookup::api::router::build_router;
use ip_lookup::config::Config;
use ip_lookup::lookup::engine::ResolutionEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env_and_args()?;

    // 1. Reference tables (fatal on failure):
    let engine = Arc::new(
        ResolutionEngine::load(config.proxy_db.clone(), config.location_db.clone()).await?,
    );

    // 2. Rate limiter and its sweeper:
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max,
        config.rate_limit_window,
    ));
    limiter.spawn_sweeper();

    // 3. HTTP Router:
    let app = build_router(engine, limiter, &config);

    // 4. Start HTTP server:
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    tracing::info!("API Server running on http://{}", config.bind);
    tracing::info!("  GET /api/ip            - Get your IP information");
    tracing::info!("  GET /api/ip/:ip        - Get information for a specific IP");
    tracing::info!("  GET /api/health        - Health check");
    tracing::info!("  GET /api/attribution   - Database attribution information");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
