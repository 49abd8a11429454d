//! Soil sample models for crop recommendation

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::validation::{validate_numeric_field, validate_ph_level, FieldErrors};

/// The seven soil/climate inputs of the recommendation form
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoilField {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl SoilField {
    pub const ALL: [SoilField; 7] = [
        SoilField::Nitrogen,
        SoilField::Phosphorus,
        SoilField::Potassium,
        SoilField::Temperature,
        SoilField::Humidity,
        SoilField::Ph,
        SoilField::Rainfall,
    ];

    /// Key used on the wire and in per-field error maps
    pub fn key(&self) -> &'static str {
        match self {
            SoilField::Nitrogen => "N",
            SoilField::Phosphorus => "P",
            SoilField::Potassium => "K",
            SoilField::Temperature => "temperature",
            SoilField::Humidity => "humidity",
            SoilField::Ph => "ph",
            SoilField::Rainfall => "rainfall",
        }
    }

    /// Form label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            SoilField::Nitrogen => "N (kg/ha)",
            SoilField::Phosphorus => "P (kg/ha)",
            SoilField::Potassium => "K (kg/ha)",
            SoilField::Temperature => "Temperature (°C)",
            SoilField::Humidity => "Humidity (%)",
            SoilField::Ph => "pH Level",
            SoilField::Rainfall => "Rainfall (mm)",
        }
    }

    /// Every field except pH is typed in as a free number
    pub fn is_numeric(&self) -> bool {
        !matches!(self, SoilField::Ph)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        SoilField::ALL.iter().copied().find(|f| f.key() == key)
    }
}

impl fmt::Display for SoilField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A pH level picked from the fixed 5.0 to 7.0 list, stored in tenths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhLevel(u8);

impl PhLevel {
    pub const MIN_TENTHS: u8 = 50;
    pub const MAX_TENTHS: u8 = 70;

    pub fn from_tenths(tenths: u8) -> Option<Self> {
        (Self::MIN_TENTHS..=Self::MAX_TENTHS)
            .contains(&tenths)
            .then_some(PhLevel(tenths))
    }

    /// Parse one of the listed options ("5.0" ... "7.0")
    pub fn parse(value: &str) -> Option<Self> {
        let parsed: f64 = value.trim().parse().ok()?;
        if !parsed.is_finite() {
            return None;
        }
        let scaled = parsed * 10.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-9 || rounded < 0.0 || rounded > u8::MAX as f64 {
            return None;
        }
        Self::from_tenths(rounded as u8)
    }

    pub fn value(&self) -> f64 {
        f64::from(self.0) / 10.0
    }

    /// All selectable levels, in order, as the picker lists them
    pub fn options() -> Vec<String> {
        (Self::MIN_TENTHS..=Self::MAX_TENTHS)
            .map(|t| PhLevel(t).to_string())
            .collect()
    }
}

impl fmt::Display for PhLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

impl Serialize for PhLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// A validated, immutable snapshot of the recommendation form
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SoilSample {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: PhLevel,
    pub rainfall: f64,
}

/// The editable recommendation form: raw text per field plus current errors
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SoilForm {
    #[serde(rename = "N", default)]
    pub nitrogen: String,
    #[serde(rename = "P", default)]
    pub phosphorus: String,
    #[serde(rename = "K", default)]
    pub potassium: String,
    #[serde(default)]
    pub temperature: String,
    #[serde(default)]
    pub humidity: String,
    #[serde(default)]
    pub ph: String,
    #[serde(default)]
    pub rainfall: String,
    #[serde(default, skip_deserializing)]
    pub errors: FieldErrors,
}

impl SoilForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: SoilField) -> &str {
        match field {
            SoilField::Nitrogen => &self.nitrogen,
            SoilField::Phosphorus => &self.phosphorus,
            SoilField::Potassium => &self.potassium,
            SoilField::Temperature => &self.temperature,
            SoilField::Humidity => &self.humidity,
            SoilField::Ph => &self.ph,
            SoilField::Rainfall => &self.rainfall,
        }
    }

    fn slot(&mut self, field: SoilField) -> &mut String {
        match field {
            SoilField::Nitrogen => &mut self.nitrogen,
            SoilField::Phosphorus => &mut self.phosphorus,
            SoilField::Potassium => &mut self.potassium,
            SoilField::Temperature => &mut self.temperature,
            SoilField::Humidity => &mut self.humidity,
            SoilField::Ph => &mut self.ph,
            SoilField::Rainfall => &mut self.rainfall,
        }
    }

    /// Store a new value and re-check that one field.
    ///
    /// The outcome replaces whatever error the field had before. Returns
    /// whether the new value is acceptable; editing is never refused.
    pub fn set_field(&mut self, field: SoilField, value: impl Into<String>) -> bool {
        *self.slot(field) = value.into();
        self.check_field(field)
    }

    fn check_field(&mut self, field: SoilField) -> bool {
        let value = self.value(field).to_string();
        let outcome = if field.is_numeric() {
            validate_numeric_field(field.key(), &value).map(|_| ())
        } else {
            validate_ph_level(&value).map(|_| ())
        };

        match outcome {
            Ok(()) => {
                self.errors.clear(field.key());
                true
            }
            Err(e) => {
                self.errors.set(field.key(), e.message);
                false
            }
        }
    }

    /// Validate every field and build the sample, failing closed.
    ///
    /// On failure the form's error map holds one message per bad field and
    /// a copy of it is returned.
    pub fn validate(&mut self) -> Result<SoilSample, FieldErrors> {
        for field in SoilField::ALL {
            self.check_field(field);
        }
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }

        let number = |field: SoilField| validate_numeric_field(field.key(), self.value(field));
        Ok(SoilSample {
            nitrogen: number(SoilField::Nitrogen)?,
            phosphorus: number(SoilField::Phosphorus)?,
            potassium: number(SoilField::Potassium)?,
            temperature: number(SoilField::Temperature)?,
            humidity: number(SoilField::Humidity)?,
            ph: validate_ph_level(&self.ph)?,
            rainfall: number(SoilField::Rainfall)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SoilForm {
        let mut form = SoilForm::new();
        form.set_field(SoilField::Nitrogen, "90");
        form.set_field(SoilField::Phosphorus, "42");
        form.set_field(SoilField::Potassium, "43");
        form.set_field(SoilField::Temperature, "20.8");
        form.set_field(SoilField::Humidity, "82");
        form.set_field(SoilField::Ph, "6.5");
        form.set_field(SoilField::Rainfall, "202.9");
        form
    }

    #[test]
    fn test_ph_options_cover_range() {
        let options = PhLevel::options();
        assert_eq!(options.len(), 21);
        assert_eq!(options.first().map(String::as_str), Some("5.0"));
        assert_eq!(options.last().map(String::as_str), Some("7.0"));
    }

    #[test]
    fn test_ph_parse() {
        assert_eq!(PhLevel::parse("6.5").map(|p| p.value()), Some(6.5));
        assert_eq!(PhLevel::parse("7").map(|p| p.to_string()), Some("7.0".into()));
        assert!(PhLevel::parse("4.9").is_none());
        assert!(PhLevel::parse("6.55").is_none());
        assert!(PhLevel::parse("acid").is_none());
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in SoilField::ALL {
            assert_eq!(SoilField::from_key(field.key()), Some(field));
        }
        assert_eq!(SoilField::from_key("n"), None);
    }

    #[test]
    fn test_set_field_replaces_prior_error() {
        let mut form = SoilForm::new();
        assert!(!form.set_field(SoilField::Nitrogen, "abc"));
        assert_eq!(form.errors.get("N"), Some("Please enter a valid number"));

        assert!(form.set_field(SoilField::Nitrogen, "12"));
        assert_eq!(form.errors.get("N"), None);
        assert_eq!(form.nitrogen, "12");
    }

    #[test]
    fn test_validate_complete_form() {
        let mut form = filled_form();
        let sample = form.validate().unwrap();
        assert_eq!(sample.nitrogen, 90.0);
        assert_eq!(sample.ph.value(), 6.5);
        assert_eq!(sample.rainfall, 202.9);
    }

    #[test]
    fn test_validate_fails_closed_on_any_bad_field() {
        let mut form = filled_form();
        form.set_field(SoilField::Humidity, "wet");
        form.ph.clear();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("humidity").is_some());
        assert!(errors.get("ph").is_some());
    }

    #[test]
    fn test_out_of_range_values_are_accepted() {
        let mut form = filled_form();
        form.set_field(SoilField::Humidity, "250");
        form.set_field(SoilField::Temperature, "-80");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_sample_wire_format() {
        let sample = filled_form().validate().unwrap();
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["N"], 90.0);
        assert_eq!(json["K"], 43.0);
        assert_eq!(json["ph"], 6.5);
    }
}
