//! Farm Assist - Gateway Server
//!
//! Fronts the generative chat, crop prediction and weather services for the
//! mobile app.

use std::{net::SocketAddr, sync::Arc};

use farm_assist_backend::{
    create_app,
    external::{ConfiguredCredentials, CredentialProvider, CropPredictionClient, GeminiClient, WeatherClient},
    services::ScreenContext,
    storage::JsonFileStore,
    AppState, Config,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "farm_assist_server=debug,farm_assist_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm Assist Server");
    tracing::info!("Environment: {}", config.environment);

    let configured = ConfiguredCredentials::from_config(&config);
    for service in configured.missing() {
        tracing::warn!("No API key configured for {}", service.name());
    }
    let credentials: Arc<dyn CredentialProvider> = Arc::new(configured);

    let store = JsonFileStore::open(&config.storage.path).await?;

    let shutdown = CancellationToken::new();
    let state = AppState::new(
        ScreenContext::new(&config.screen, shutdown.clone()),
        Arc::new(GeminiClient::from_config(&config.gemini, credentials.clone())),
        Arc::new(CropPredictionClient::from_config(&config.crop, credentials.clone())),
        Arc::new(WeatherClient::from_config(&config.weather, credentials)),
        Arc::new(store),
    );

    let sweeper = state
        .idle_sweeper()
        .spawn(state.context.shutdown_token().clone());

    // Build application
    let app = create_app(state.clone());

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    if let Err(e) = sweeper.await {
        tracing::error!("Idle session sweeper failed: {}", e);
    }
    state.close_all_sessions().await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, cancelling every open screen first
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown requested");
    shutdown.cancel();
}
