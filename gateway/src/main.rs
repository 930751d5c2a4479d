use anyhow::Result;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;

use config::GatewayConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "loss_gateway=debug,tower_http=info,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    let state = AppState::default();
    tracing::info!(
        "   Loaded {} fiber standards: {}",
        state.catalog.len(),
        state.catalog.codes().collect::<Vec<_>>().join(", ")
    );

    let api_routes = routes::app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Static file serving for UI (if present)
    let app = if config.ui_dir.exists() {
        tracing::info!("   Serving UI from {}", config.ui_dir.display());
        api_routes.fallback_service(ServeDir::new(&config.ui_dir))
    } else {
        tracing::warn!("   UI directory {} not found, serving API only", config.ui_dir.display());
        api_routes
    };

    let addr = config.addr();
    tracing::info!("Loss Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
