//! Farm Assist gateway
//!
//! Serves the mobile front end: per-screen sessions for the agriculture
//! chat, crop recommendation and weather forecast, plus first-launch
//! routing. Every third-party call goes through this process so API keys
//! never ship with the app.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod storage;

pub use config::Config;

use external::{ChatApi, CropApi, WeatherApi};
use services::{
    ChatSession, IdleSessionSweeper, LaunchService, RecommendationSession, ScreenContext,
    SessionRegistry, WeatherSession,
};
use storage::KeyValueStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub context: ScreenContext,
    pub chat_api: Arc<dyn ChatApi>,
    pub crop_api: Arc<dyn CropApi>,
    pub weather_api: Arc<dyn WeatherApi>,
    pub launch: LaunchService,
    pub chat_sessions: Arc<SessionRegistry<ChatSession>>,
    pub recommendation_sessions: Arc<SessionRegistry<RecommendationSession>>,
    pub weather_sessions: Arc<SessionRegistry<WeatherSession>>,
}

impl AppState {
    pub fn new(
        context: ScreenContext,
        chat_api: Arc<dyn ChatApi>,
        crop_api: Arc<dyn CropApi>,
        weather_api: Arc<dyn WeatherApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            context,
            chat_api,
            crop_api,
            weather_api,
            launch: LaunchService::new(store),
            chat_sessions: Arc::new(SessionRegistry::new("Chat session")),
            recommendation_sessions: Arc::new(SessionRegistry::new("Recommendation session")),
            weather_sessions: Arc::new(SessionRegistry::new("Weather session")),
        }
    }

    /// Sweeper over all three registries, using the screen idle settings
    pub fn idle_sweeper(&self) -> IdleSessionSweeper {
        IdleSessionSweeper::new(
            self.chat_sessions.clone(),
            self.recommendation_sessions.clone(),
            self.weather_sessions.clone(),
            self.context.idle_timeout,
            self.context.sweep_interval,
        )
    }

    /// Close every open screen, dropping pending requests
    pub async fn close_all_sessions(&self) {
        self.chat_sessions.close_all().await;
        self.recommendation_sessions.close_all().await;
        self.weather_sessions.close_all().await;
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Assist API v1.0"
}
