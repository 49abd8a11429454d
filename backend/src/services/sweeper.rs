//! Background task closing screen sessions the client abandoned

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::registry::SessionRegistry;
use super::{ChatSession, RecommendationSession, WeatherSession};

pub struct IdleSessionSweeper {
    chat: Arc<SessionRegistry<ChatSession>>,
    recommendation: Arc<SessionRegistry<RecommendationSession>>,
    weather: Arc<SessionRegistry<WeatherSession>>,
    idle_timeout: Duration,
    poll_interval: Duration,
}

impl IdleSessionSweeper {
    pub fn new(
        chat: Arc<SessionRegistry<ChatSession>>,
        recommendation: Arc<SessionRegistry<RecommendationSession>>,
        weather: Arc<SessionRegistry<WeatherSession>>,
        idle_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            chat,
            recommendation,
            weather,
            idle_timeout,
            poll_interval,
        }
    }

    /// Run until `shutdown` is cancelled
    pub fn spawn(self, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.start(shutdown).await;
        })
    }

    async fn start(&self, shutdown: CancellationToken) {
        tracing::info!(
            "Starting idle session sweeper with interval {:?}, idle timeout {:?}",
            self.poll_interval,
            self.idle_timeout
        );

        let mut interval = interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    self.sweep().await;
                }
            }
        }
        tracing::debug!("Idle session sweeper stopped");
    }

    /// Close idle sessions of every kind, returning how many were closed
    pub async fn sweep(&self) -> usize {
        let closed = self.chat.close_idle(self.idle_timeout).await
            + self.recommendation.close_idle(self.idle_timeout).await
            + self.weather.close_idle(self.idle_timeout).await;
        if closed > 0 {
            tracing::info!(count = closed, "Swept idle screen sessions");
        } else {
            tracing::debug!("Idle sweep: nothing to close");
        }
        closed
    }
}
