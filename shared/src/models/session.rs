//! Screen session and launch models

use serde::{Deserialize, Serialize};

/// Lifecycle of one screen's request orchestration
///
/// `Succeeded` and `Failed` are resting states: the screen accepts a new
/// submission from either of them just as it does from `Idle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScreenState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl ScreenState {
    /// Whether a new submission may start from this state
    pub fn accepts_submission(&self) -> bool {
        matches!(
            self,
            ScreenState::Idle | ScreenState::Succeeded | ScreenState::Failed
        )
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ScreenState::Validating | ScreenState::Submitting)
    }
}

/// Where the app goes when it starts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchRoute {
    GetStarted,
    Dashboard,
}
