//! HTTP handlers for first-launch routing

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{LaunchRoute, ThemeMode, ThemePalette};

use crate::error::AppResult;
use crate::AppState;

#[derive(Serialize)]
pub struct LaunchResponse {
    pub route: LaunchRoute,
    pub theme: ThemeMode,
    pub palette: ThemePalette,
}

/// Where the app should start, with the theme it should start in
pub async fn get_launch_route(State(state): State<AppState>) -> AppResult<Json<LaunchResponse>> {
    let route = state.launch.resolve_route().await?;
    let theme = state.context.theme;
    Ok(Json(LaunchResponse {
        route,
        theme,
        palette: theme.palette(),
    }))
}

/// The user finished the get-started screen
pub async fn complete_launch(State(state): State<AppState>) -> AppResult<Json<LaunchResponse>> {
    state.launch.complete_get_started().await?;
    get_launch_route(State(state)).await
}
