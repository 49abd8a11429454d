//! Per-screen request orchestration
//!
//! A screen moves through `Idle -> Validating -> Submitting -> Succeeded |
//! Failed`. Only one request is ever in flight per screen, and closing the
//! screen cancels whatever is pending so its result is never applied.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use shared::{ScreenState, ThemeMode};
use tokio_util::sync::CancellationToken;

use crate::config::ScreenConfig;
use crate::error::{AppError, AppResult};

/// Settings and lifetime handed to every screen when it is opened
#[derive(Debug, Clone)]
pub struct ScreenContext {
    pub reply_word_limit: usize,
    pub forecast_days: usize,
    pub theme: ThemeMode,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
    shutdown: CancellationToken,
}

impl ScreenContext {
    pub fn new(config: &ScreenConfig, shutdown: CancellationToken) -> Self {
        Self {
            reply_word_limit: config.reply_word_limit,
            forecast_days: config.forecast_days,
            theme: config.theme,
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            sweep_interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
            shutdown,
        }
    }

    /// Token cancelled when the whole application shuts down
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self::new(&ScreenConfig::default(), CancellationToken::new())
    }
}

/// State machine guarding one screen's submissions
#[derive(Debug)]
pub struct ScreenOrchestrator {
    state: Mutex<ScreenState>,
    token: CancellationToken,
}

impl ScreenOrchestrator {
    pub fn new(context: &ScreenContext) -> Self {
        Self {
            state: Mutex::new(ScreenState::Idle),
            token: context.shutdown.child_token(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        // State is a plain enum, a poisoned lock still holds a valid value
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ScreenState) {
        *self.lock() = state;
    }

    pub fn state(&self) -> ScreenState {
        *self.lock()
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    fn transition(&self, to: ScreenState) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::ScreenClosed);
        }
        let mut state = self.lock();
        if !state.accepts_submission() {
            return Err(AppError::SubmissionPending);
        }
        *state = to;
        Ok(())
    }

    /// Start validating input ahead of a submission
    pub fn begin_validation(&self) -> AppResult<Validation<'_>> {
        self.transition(ScreenState::Validating)?;
        Ok(Validation {
            orchestrator: self,
            decided: false,
        })
    }

    /// Start a submission that needs no validation step
    pub fn begin_submission(&self) -> AppResult<Submission<'_>> {
        self.transition(ScreenState::Submitting)?;
        Ok(Submission {
            orchestrator: self,
            finished: false,
        })
    }

    /// The user changed an input: a failed screen goes back to idle
    pub fn edit(&self) -> AppResult<()> {
        if self.is_closed() {
            return Err(AppError::ScreenClosed);
        }
        let mut state = self.lock();
        if *state == ScreenState::Failed {
            *state = ScreenState::Idle;
        }
        Ok(())
    }

    /// Close the screen, dropping any pending request
    pub fn close(&self) {
        self.token.cancel();
    }
}

/// Input is being checked; the screen refuses other submissions meanwhile
#[must_use]
pub struct Validation<'a> {
    orchestrator: &'a ScreenOrchestrator,
    decided: bool,
}

impl<'a> Validation<'a> {
    /// Input was bad: fail closed back to idle
    pub fn reject(mut self) {
        self.decided = true;
        self.orchestrator.set_state(ScreenState::Idle);
    }

    /// Input was good: move on to submitting
    pub fn accept(mut self) -> Submission<'a> {
        self.decided = true;
        self.orchestrator.set_state(ScreenState::Submitting);
        Submission {
            orchestrator: self.orchestrator,
            finished: false,
        }
    }
}

impl Drop for Validation<'_> {
    fn drop(&mut self) {
        if !self.decided {
            self.orchestrator.set_state(ScreenState::Idle);
        }
    }
}

/// A request is in flight
#[must_use]
pub struct Submission<'a> {
    orchestrator: &'a ScreenOrchestrator,
    finished: bool,
}

impl Submission<'_> {
    /// Await the request unless the screen is closed first.
    ///
    /// Records `Succeeded` or `Failed`. When the screen closes while waiting
    /// the request future is dropped and `Cancelled` is returned.
    pub async fn run<T, F>(mut self, request: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        let token = self.orchestrator.token.clone();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(AppError::Cancelled),
            result = request => {
                if token.is_cancelled() {
                    Err(AppError::Cancelled)
                } else {
                    result
                }
            }
        };

        self.finished = true;
        self.orchestrator.set_state(match &outcome {
            Ok(_) => ScreenState::Succeeded,
            Err(AppError::Cancelled) => ScreenState::Idle,
            Err(_) => ScreenState::Failed,
        });
        if let Err(AppError::Cancelled) = &outcome {
            tracing::warn!("Screen closed while a request was pending; result dropped");
        }
        outcome
    }
}

// The caller went away mid-request (e.g. the HTTP client disconnected)
impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.orchestrator.set_state(ScreenState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_reject_returns_to_idle() {
        let orchestrator = ScreenOrchestrator::new(&ScreenContext::default());
        let validation = orchestrator.begin_validation().unwrap();
        assert_eq!(orchestrator.state(), ScreenState::Validating);
        validation.reject();
        assert_eq!(orchestrator.state(), ScreenState::Idle);
    }

    #[test]
    fn test_dropped_validation_returns_to_idle() {
        let orchestrator = ScreenOrchestrator::new(&ScreenContext::default());
        {
            let _validation = orchestrator.begin_validation().unwrap();
        }
        assert_eq!(orchestrator.state(), ScreenState::Idle);
    }

    #[tokio::test]
    async fn test_success_and_failure_states() {
        let orchestrator = ScreenOrchestrator::new(&ScreenContext::default());

        let ok: AppResult<u8> = orchestrator
            .begin_submission()
            .unwrap()
            .run(async { Ok(1) })
            .await;
        assert_eq!(ok.unwrap(), 1);
        assert_eq!(orchestrator.state(), ScreenState::Succeeded);

        let err: AppResult<u8> = orchestrator
            .begin_submission()
            .unwrap()
            .run(async { Err(AppError::external("Failed", "boom")) })
            .await;
        assert!(err.is_err());
        assert_eq!(orchestrator.state(), ScreenState::Failed);

        orchestrator.edit().unwrap();
        assert_eq!(orchestrator.state(), ScreenState::Idle);
    }

    #[test]
    fn test_second_submission_rejected_while_pending() {
        let orchestrator = ScreenOrchestrator::new(&ScreenContext::default());
        let _first = orchestrator.begin_submission().unwrap();
        assert!(matches!(
            orchestrator.begin_submission(),
            Err(AppError::SubmissionPending)
        ));
        assert!(matches!(
            orchestrator.begin_validation(),
            Err(AppError::SubmissionPending)
        ));
    }

    #[tokio::test]
    async fn test_close_cancels_pending_request() {
        let orchestrator = ScreenOrchestrator::new(&ScreenContext::default());
        let submission = orchestrator.begin_submission().unwrap();

        let pending = submission.run(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, AppError>("late")
        });
        orchestrator.close();

        assert!(matches!(pending.await, Err(AppError::Cancelled)));
        assert!(matches!(
            orchestrator.begin_submission(),
            Err(AppError::ScreenClosed)
        ));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_every_screen() {
        let context = ScreenContext::default();
        let a = ScreenOrchestrator::new(&context);
        let b = ScreenOrchestrator::new(&context);
        context.shutdown_token().cancel();
        assert!(a.is_closed());
        assert!(b.is_closed());
    }
}
