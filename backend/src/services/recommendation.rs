//! Crop recommendation screen

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use shared::{
    normalize_recommendation, PhLevel, RecommendationResult, RecommendationView, ScreenState,
    SoilField, SoilForm, INVALID_FORM_MESSAGE,
};
use uuid::Uuid;

use super::orchestrator::{ScreenContext, ScreenOrchestrator};
use super::registry::ScreenSession;
use crate::error::{AppError, AppResult};
use crate::external::crop_prediction::RECOMMENDATION_FAILURE_MESSAGE;
use crate::external::CropApi;

#[derive(Debug, Default)]
struct RecommendationState {
    form: SoilForm,
    result: Option<RecommendationResult>,
    message: Option<String>,
}

/// What the recommendation screen renders
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSnapshot {
    pub id: Uuid,
    pub state: ScreenState,
    pub form: SoilForm,
    pub ph_options: Vec<String>,
    pub result: Option<RecommendationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct RecommendationSession {
    id: Uuid,
    orchestrator: ScreenOrchestrator,
    api: Arc<dyn CropApi>,
    inner: Mutex<RecommendationState>,
}

impl RecommendationSession {
    pub fn new(context: &ScreenContext, api: Arc<dyn CropApi>) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestrator: ScreenOrchestrator::new(context),
            api,
            inner: Mutex::new(RecommendationState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RecommendationState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ScreenState {
        self.orchestrator.state()
    }

    /// Last successful recommendation, if any
    pub fn result(&self) -> Option<RecommendationResult> {
        self.lock().result.clone()
    }

    pub fn snapshot(&self) -> RecommendationSnapshot {
        let inner = self.lock();
        RecommendationSnapshot {
            id: self.id,
            state: self.orchestrator.state(),
            form: inner.form.clone(),
            ph_options: PhLevel::options(),
            result: inner.result.as_ref().map(RecommendationView::from),
            message: inner.message.clone(),
        }
    }

    /// Edit one input. The field is re-checked on the spot.
    pub fn set_field(&self, field: SoilField, value: &str) -> AppResult<RecommendationSnapshot> {
        self.orchestrator.edit()?;
        {
            let mut inner = self.lock();
            if !inner.form.set_field(field, value) {
                tracing::debug!(session = %self.id, field = field.key(), "Field value rejected");
            }
            inner.message = None;
        }
        Ok(self.snapshot())
    }

    /// Validate the whole form, then ask for a prediction.
    ///
    /// Nothing is sent while any field is invalid. A successful response
    /// replaces the previous result wholesale.
    pub async fn submit(&self) -> AppResult<RecommendationSnapshot> {
        let validation = self.orchestrator.begin_validation()?;
        let checked = self.lock().form.validate();
        let sample = match checked {
            Ok(sample) => sample,
            Err(errors) => {
                tracing::warn!(session = %self.id, invalid = errors.len(), "Soil form rejected");
                validation.reject();
                return Err(AppError::FieldValidation {
                    message: INVALID_FORM_MESSAGE.to_string(),
                    fields: errors,
                });
            }
        };
        let submission = validation.accept();

        tracing::info!(session = %self.id, "Requesting crop recommendation");
        let outcome = submission
            .run(async {
                let body = self.api.predict(&sample).await?;
                normalize_recommendation(&body)
                    .map_err(|e| AppError::external(RECOMMENDATION_FAILURE_MESSAGE, e))
            })
            .await;

        match outcome {
            Ok(result) => {
                let mut inner = self.lock();
                inner.message = Some(format!("Recommended crop: {}", result.predicted_crop));
                inner.result = Some(result);
            }
            Err(e) => {
                if !matches!(e, AppError::Cancelled) {
                    self.lock().message = Some(e.user_message());
                }
                return Err(e);
            }
        }
        Ok(self.snapshot())
    }
}

impl ScreenSession for RecommendationSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn close(&self) {
        self.orchestrator.close();
    }
}
