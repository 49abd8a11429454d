//! First-launch routing

use std::sync::Arc;

use shared::LaunchRoute;

use crate::error::AppResult;
use crate::storage::KeyValueStore;

/// Key set once the get-started screen has been completed
pub const LAUNCH_FLAG_KEY: &str = "alreadyLaunched";

#[derive(Clone)]
pub struct LaunchService {
    store: Arc<dyn KeyValueStore>,
}

impl LaunchService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Get-started on the very first launch, the dashboard afterwards
    pub async fn resolve_route(&self) -> AppResult<LaunchRoute> {
        let route = match self.store.get(LAUNCH_FLAG_KEY).await? {
            Some(_) => LaunchRoute::Dashboard,
            None => LaunchRoute::GetStarted,
        };
        tracing::debug!(?route, "Resolved launch route");
        Ok(route)
    }

    pub async fn complete_get_started(&self) -> AppResult<()> {
        self.store.set(LAUNCH_FLAG_KEY, "true").await?;
        tracing::info!("First launch completed");
        Ok(())
    }
}
