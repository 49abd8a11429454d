//! Weather data models

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A named place resolved by geocoding or the device location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One day of the forecast, sampled at local noon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub local_time: NaiveDateTime,
    pub temperature_celsius: Decimal,
    pub feels_like_celsius: Decimal,
    pub humidity_percent: i32,
    pub wind_speed_mps: Decimal,
    pub description: String,
    /// Upstream icon code, e.g. "10d"
    pub condition_icon: String,
    /// Icon the front end renders for the code
    pub icon_name: String,
}

impl ForecastEntry {
    /// Date label as the weather screen prints it, e.g. "Mon, Jun 3"
    pub fn date_label(&self) -> String {
        self.date.format("%a, %b %-d").to_string()
    }
}

/// Forecast shown on the weather screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    pub location: Location,
    pub entries: Vec<ForecastEntry>,
}
