//! Route definitions for the Farm Assist gateway

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // First-launch routing
        .route("/launch", get(handlers::get_launch_route))
        .route("/launch/complete", post(handlers::complete_launch))
        // Screens
        .nest("/chat", chat_routes())
        .nest("/recommendations", recommendation_routes())
        .nest("/weather", weather_routes())
}

/// Agriculture chat screen
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::open_chat_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_chat_session).delete(handlers::close_chat_session),
        )
        .route(
            "/sessions/:session_id/messages",
            post(handlers::send_chat_message),
        )
}

/// Crop recommendation screen
fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::open_recommendation_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_recommendation_session)
                .delete(handlers::close_recommendation_session),
        )
        .route(
            "/sessions/:session_id/fields/:field",
            put(handlers::set_recommendation_field),
        )
        .route(
            "/sessions/:session_id/submit",
            post(handlers::submit_recommendation),
        )
}

/// Weather forecast screen
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(handlers::open_weather_session))
        .route(
            "/sessions/:session_id",
            get(handlers::get_weather_session).delete(handlers::close_weather_session),
        )
        .route("/sessions/:session_id/search", post(handlers::search_weather_city))
        .route("/sessions/:session_id/locate", post(handlers::locate_weather))
}
