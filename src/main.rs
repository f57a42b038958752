//! Acolhe - guided support chat service
//!
//! Hosts scripted support conversations: a small state machine walking a
//! hand-authored conversation graph, exposed to the app over HTTP.

mod api;
mod config;
mod graph;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::AppConfig;
use graph::FlowLibrary;
use runtime::{Dialer, LoggingDialer, RuntimeManager, WebhookDialer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle conversations are swept
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acolhe=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();

    // Load flows; any invalid graph stops startup
    let mut flows = FlowLibrary::builtin()?;
    if let Some(dir) = &config.flows_dir {
        let loaded = flows.load_dir(dir)?;
        tracing::info!(dir = %dir.display(), loaded, "Loaded flow files");
    }
    tracing::info!(flows = ?flows.names(), "Flow library ready");

    let dialer: Arc<dyn Dialer> = match &config.dial_webhook {
        Some(url) => {
            tracing::info!(url = %url, "Dialing through telephony webhook");
            Arc::new(WebhookDialer::new(url)?)
        }
        None => Arc::new(LoggingDialer),
    };

    // Create application state
    let runtime = Arc::new(RuntimeManager::new(flows, dialer, &config.crisis_line));
    RuntimeManager::spawn_eviction(&runtime, EVICTION_INTERVAL, config.idle_timeout);
    let state = AppState::new(runtime);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Acolhe server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
