//! Air quality reading model and display methods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized air quality and weather reading for one city
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Reading {
    /// Air Quality Index
    pub aqi: u32,
    /// Human-readable forecast text
    pub forecast_label: String,
    /// Temperature in Celsius
    pub temp_c: Option<f64>,
    /// Relative humidity percentage (0-100)
    pub humidity_pct: Option<f64>,
    /// Wind speed in km/h
    pub wind_kph: Option<f64>,
    /// PM2.5 concentration in µg/m³
    pub pm25: Option<f64>,
    /// Timestamp of the newest measurement, when the source reports one
    pub observed_at: Option<DateTime<Utc>>,
}

impl Reading {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> Option<String> {
        self.temp_c.map(|t| format!("{} °C", format_number(t)))
    }

    /// Format humidity with unit
    #[must_use]
    pub fn format_humidity(&self) -> Option<String> {
        self.humidity_pct.map(|h| format!("{} %", format_number(h)))
    }

    /// Format wind speed with unit
    #[must_use]
    pub fn format_wind(&self) -> Option<String> {
        self.wind_kph.map(|w| format!("{w:.1} km/h"))
    }

    /// Format PM2.5 concentration with unit
    #[must_use]
    pub fn format_pm25(&self) -> Option<String> {
        self.pm25.map(|p| format!("{p:.1} µg/m³"))
    }
}

/// Result of asking a reading source about a city.
///
/// `NoData` means the source answered but had nothing recent to report;
/// it is a valid outcome, not a failure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status", content = "reading", rename_all = "snake_case")]
pub enum ReadingOutcome {
    Reading(Reading),
    NoData,
}

impl ReadingOutcome {
    #[must_use]
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            ReadingOutcome::Reading(reading) => Some(reading),
            ReadingOutcome::NoData => None,
        }
    }

    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, ReadingOutcome::NoData)
    }
}

/// Whole numbers print without a fraction, everything else with one decimal.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
