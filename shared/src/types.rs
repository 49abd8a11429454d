//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Display theme chosen for a device
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn code(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Color palette rendered by the front end for this mode
    pub fn palette(&self) -> ThemePalette {
        match self {
            ThemeMode::Light => ThemePalette {
                background: "#F9FAFB",
                text: "#1F2937",
                card: "#FFFFFF",
                border: "#E5E7EB",
                primary: "#3B82F6",
                secondary: "#6B7280",
            },
            ThemeMode::Dark => ThemePalette {
                background: "#1F2937",
                text: "#FFFFFF",
                card: "#374151",
                border: "#4B5563",
                primary: "#60A5FA",
                secondary: "#9CA3AF",
            },
        }
    }
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("Unknown theme mode: {}", other)),
        }
    }
}

/// Hex colors for one theme mode
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: &'static str,
    pub text: &'static str,
    pub card: &'static str,
    pub border: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}
