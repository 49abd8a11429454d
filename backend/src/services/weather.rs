//! Weather forecast screen

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use shared::{
    normalize_forecast, normalize_geocode, validate_city, validate_coordinates, Coordinates,
    Location, ScreenState, WeatherReport,
};
use uuid::Uuid;

use super::orchestrator::{ScreenContext, ScreenOrchestrator};
use super::registry::ScreenSession;
use crate::error::{AppError, AppResult};
use crate::external::weather::WEATHER_FAILURE_MESSAGE;
use crate::external::WeatherApi;

/// Name used for a device position without a reverse-geocoded city
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

#[derive(Debug, Default)]
struct WeatherState {
    report: Option<WeatherReport>,
    error: Option<String>,
}

/// What the weather screen renders
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSnapshot {
    pub id: Uuid,
    pub state: ScreenState,
    pub report: Option<WeatherReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct WeatherSession {
    id: Uuid,
    orchestrator: ScreenOrchestrator,
    api: Arc<dyn WeatherApi>,
    forecast_days: usize,
    inner: Mutex<WeatherState>,
}

impl WeatherSession {
    pub fn new(context: &ScreenContext, api: Arc<dyn WeatherApi>) -> Self {
        Self {
            id: Uuid::new_v4(),
            orchestrator: ScreenOrchestrator::new(context),
            api,
            forecast_days: context.forecast_days,
            inner: Mutex::new(WeatherState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WeatherState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ScreenState {
        self.orchestrator.state()
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        let inner = self.lock();
        WeatherSnapshot {
            id: self.id,
            state: self.orchestrator.state(),
            report: inner.report.clone(),
            error: inner.error.clone(),
        }
    }

    /// Look a city up by name, then fetch its forecast
    pub async fn search_city(&self, city: &str) -> AppResult<WeatherSnapshot> {
        let validation = self.orchestrator.begin_validation()?;
        let city = match validate_city(city) {
            Ok(city) => city.to_string(),
            Err(e) => {
                validation.reject();
                self.lock().error = Some(e.message.clone());
                return Err(e.into());
            }
        };
        let submission = validation.accept();
        self.lock().error = None;

        tracing::info!(session = %self.id, %city, "Searching weather by city");
        let outcome = submission
            .run(async {
                let body = self.api.geocode(&city).await?;
                let location = normalize_geocode(&body)
                    .map_err(|e| AppError::external(WEATHER_FAILURE_MESSAGE, e))?
                    .ok_or(AppError::CityNotFound)?;
                self.fetch_report(location).await
            })
            .await;

        self.apply(outcome)
    }

    /// Fetch the forecast for a known position, e.g. the device location
    pub async fn use_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        name: Option<String>,
    ) -> AppResult<WeatherSnapshot> {
        let validation = self.orchestrator.begin_validation()?;
        if let Err(e) = validate_coordinates(latitude, longitude) {
            validation.reject();
            return Err(e.into());
        }
        let submission = validation.accept();
        self.lock().error = None;

        let location = Location {
            name: name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| CURRENT_LOCATION_NAME.to_string()),
            latitude,
            longitude,
        };
        tracing::info!(session = %self.id, latitude, longitude, "Fetching weather for coordinates");
        let outcome = submission.run(self.fetch_report(location)).await;

        self.apply(outcome)
    }

    async fn fetch_report(&self, location: Location) -> AppResult<WeatherReport> {
        let body = self
            .api
            .forecast(Coordinates::new(location.latitude, location.longitude))
            .await?;
        let entries = normalize_forecast(&body, self.forecast_days)
            .map_err(|e| AppError::external(WEATHER_FAILURE_MESSAGE, e))?;
        Ok(WeatherReport { location, entries })
    }

    /// A new report replaces the old one; a failure keeps the old one on screen
    fn apply(&self, outcome: AppResult<WeatherReport>) -> AppResult<WeatherSnapshot> {
        match outcome {
            Ok(report) => {
                tracing::debug!(session = %self.id, days = report.entries.len(), "Forecast updated");
                self.lock().report = Some(report);
                Ok(self.snapshot())
            }
            Err(AppError::Cancelled) => Err(AppError::Cancelled),
            Err(e) => {
                self.lock().error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

impl ScreenSession for WeatherSession {
    fn id(&self) -> Uuid {
        self.id
    }

    fn close(&self) {
        self.orchestrator.close();
    }
}
