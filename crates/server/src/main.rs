use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod routes;
mod settings;
mod state;

use settings::Settings;
use state::{AppState, SharedState};

/// Upper bound for one request, topic research included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

fn app(state: SharedState) -> Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wikiharvest_core=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(language = %settings.language, report_dir = %settings.report_dir.display(), "starting wikiharvest server");

    let state = AppState::from_settings(&settings)?;
    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.addr))?;

    tracing::info!("listening on http://{}", settings.addr);
    axum::serve(listener, app(state)).await.context("Server error")?;

    Ok(())
}
