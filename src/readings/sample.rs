//! Bundled sample readings
//!
//! Stand-in data for when the live provider is not configured. Values are
//! fixed and the lookup is pure.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ReadingSource;
use crate::catalog::CityCatalog;
use crate::models::{City, Reading, ReadingOutcome};
use crate::{AqMapError, Result};

/// Notice shown alongside every sample reading
pub const SAMPLE_PROVENANCE: &str =
    "Based on sample data. Live air quality integration is not configured.";

/// `(city id, AQI, forecast, °C, humidity %)`
const SAMPLE_ROWS: [(&str, u32, &str, f64, f64); 8] = [
    ("los-angeles", 120, "Unhealthy for Sensitive Groups", 28.0, 30.0),
    ("new-york", 90, "Moderate", 23.0, 55.0),
    ("toronto", 60, "Good", 19.0, 60.0),
    ("mexico-city", 150, "Unhealthy", 25.0, 40.0),
    ("vancouver", 55, "Good", 17.0, 70.0),
    ("chicago", 100, "Unhealthy for Sensitive Groups", 20.0, 50.0),
    ("houston", 130, "Unhealthy", 30.0, 65.0),
    ("miami", 70, "Moderate", 29.0, 80.0),
];

/// Reading source backed by a fixed in-memory table of catalog cities
#[derive(Debug, Clone)]
pub struct SampleReadingSource {
    entries: Vec<(City, Reading)>,
}

impl SampleReadingSource {
    /// Sample table for the cities of `catalog`. Rows for cities the catalog
    /// does not list are skipped.
    #[must_use]
    pub fn for_catalog(catalog: &CityCatalog) -> Self {
        let entries = SAMPLE_ROWS
            .into_iter()
            .filter_map(|(id, aqi, forecast, temp_c, humidity)| {
                let Some(city) = catalog.find(id) else {
                    warn!("Sample row for '{}' has no catalog city", id);
                    return None;
                };
                Some((
                    city.clone(),
                    Reading {
                        aqi,
                        forecast_label: forecast.to_string(),
                        temp_c: Some(temp_c),
                        humidity_pct: Some(humidity),
                        wind_kph: None,
                        pm25: None,
                        observed_at: None,
                    },
                ))
            })
            .collect();

        Self { entries }
    }

    /// Look up a reading by city id or case-insensitive display name.
    pub fn lookup(&self, key: &str) -> Result<&Reading> {
        self.entries
            .iter()
            .find(|(city, _)| city.matches(key))
            .map(|(_, reading)| reading)
            .ok_or_else(|| AqMapError::unknown_city(key))
    }
}

#[async_trait]
impl ReadingSource for SampleReadingSource {
    async fn fetch(&self, city: &City) -> Result<ReadingOutcome> {
        debug!("Sample reading lookup for {}", city.id);
        self.lookup(&city.id)
            .cloned()
            .map(ReadingOutcome::Reading)
    }

    fn name(&self) -> &'static str {
        "sample"
    }

    fn provenance(&self) -> Option<&'static str> {
        Some(SAMPLE_PROVENANCE)
    }
}
