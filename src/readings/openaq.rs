//! Live air quality readings from an OpenAQ-style measurements API
//!
//! One request per fetch, bounded by the configured timeout, asking for the
//! most recent measurements for a city ordered newest first. Each returned
//! `{parameter, value, unit, datetime}` row is folded into a single
//! [`Reading`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::ReadingSource;
use super::aqi::pm25_to_aqi;
use crate::config::ProviderConfig;
use crate::models::{City, Reading, ReadingOutcome};
use crate::severity::classify_unsigned;
use crate::{AqMapError, Result};

/// Measurements response from the provider
#[derive(Debug, Deserialize)]
pub struct MeasurementsResponse {
    #[serde(default)]
    pub results: Option<Vec<Measurement>>,
}

/// A single measurement row
#[derive(Debug, Deserialize, Clone)]
pub struct Measurement {
    pub parameter: String,
    /// Some providers report `null` for a sensor that has not answered
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub datetime: Option<MeasurementTime>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MeasurementTime {
    pub utc: Option<String>,
}

impl Measurement {
    fn observed_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.datetime.as_ref()?.utc.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn unit(&self) -> String {
        self.unit.as_deref().unwrap_or_default().trim().to_lowercase()
    }
}

/// Reading source backed by the live provider
pub struct OpenAqReadingSource {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    result_limit: u32,
    timeout: Duration,
}

impl OpenAqReadingSource {
    /// Create a new client.
    ///
    /// `api_key` is sent as a bearer token when present.
    pub fn new(config: &ProviderConfig, api_key: Option<String>) -> Result<Self> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("aqmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AqMapError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
            timeout,
        })
    }

    fn request_url(&self, city: &City) -> String {
        format!(
            "{}?city={}&limit={}&sort=desc&order_by=datetime",
            self.base_url,
            urlencoding::encode(&city.name),
            self.result_limit
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> AqMapError {
        if err.is_timeout() {
            AqMapError::provider(format!(
                "request timed out after {}s",
                self.timeout.as_secs_f64()
            ))
        } else {
            AqMapError::provider(format!("request failed: {err}"))
        }
    }
}

#[async_trait]
impl ReadingSource for OpenAqReadingSource {
    #[instrument(skip(self, city), fields(city = %city.name))]
    async fn fetch(&self, city: &City) -> Result<ReadingOutcome> {
        let start_time = Instant::now();
        let url = self.request_url(city);
        debug!("Provider request URL: {}", url);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AqMapError::provider(match status.as_u16() {
                401 | 403 => "invalid or missing provider API key".to_string(),
                429 => "provider rate limit exceeded".to_string(),
                _ => format!("provider returned {status}: {error_text}"),
            }));
        }

        let body: MeasurementsResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(&e)
            } else {
                AqMapError::provider(format!("failed to parse provider response: {e}"))
            }
        })?;

        let measurements = body.results.unwrap_or_default();
        let elapsed = start_time.elapsed();
        if elapsed.as_secs() > 5 {
            warn!("Slow provider response: {:.3}s", elapsed.as_secs_f64());
        }

        if measurements.is_empty() {
            info!("Provider has no recent measurements for {}", city.name);
            return Ok(ReadingOutcome::NoData);
        }

        match normalize(&measurements) {
            Some(reading) => {
                info!(
                    "Fetched {} measurements for {} in {:.3}s (AQI {})",
                    measurements.len(),
                    city.name,
                    elapsed.as_secs_f64(),
                    reading.aqi
                );
                Ok(ReadingOutcome::Reading(reading))
            }
            None => {
                warn!(
                    "No AQI or PM2.5 among {} measurements for {}",
                    measurements.len(),
                    city.name
                );
                Ok(ReadingOutcome::NoData)
            }
        }
    }

    fn name(&self) -> &'static str {
        "openaq"
    }
}

/// Fold newest-first measurements into one reading.
///
/// The first usable value seen for each parameter wins; rows without a
/// finite value are skipped. Returns `None` when no AQI can be reported or
/// derived.
pub fn normalize(measurements: &[Measurement]) -> Option<Reading> {
    let mut latest: HashMap<String, (f64, &Measurement)> = HashMap::new();
    for m in measurements {
        let Some(value) = m.value.filter(|v| v.is_finite()) else {
            debug!("Skipping {} measurement without a value", m.parameter);
            continue;
        };
        latest
            .entry(m.parameter.trim().to_lowercase())
            .or_insert((value, m));
    }

    let value = |keys: &[&str]| keys.iter().find_map(|k| latest.get(*k).copied());

    let pm25 = value(&["pm25", "pm2.5"]).map(|(v, _)| v.max(0.0));

    let aqi = match value(&["aqi", "us-aqi", "us_aqi"]) {
        Some((v, _)) => Some(v.max(0.0).round() as u32),
        None => pm25.and_then(pm25_to_aqi),
    }?;

    let temp_c = value(&["temperature", "temp"]).map(|(v, m)| match m.unit().as_str() {
        "f" | "°f" | "fahrenheit" => (v - 32.0) * 5.0 / 9.0,
        _ => v,
    });

    let humidity_pct =
        value(&["relativehumidity", "humidity"]).map(|(v, _)| v.clamp(0.0, 100.0));

    let wind_kph = value(&["wind_speed", "windspeed"]).map(|(v, m)| {
        let kph = match m.unit().as_str() {
            "km/h" | "kph" => v,
            "mph" => v * 1.609_344,
            _ => v * 3.6,
        };
        kph.max(0.0)
    });

    let observed_at = latest
        .values()
        .filter_map(|(_, m)| m.observed_at())
        .max();

    Some(Reading {
        aqi,
        forecast_label: classify_unsigned(aqi).label.to_string(),
        temp_c,
        humidity_pct,
        wind_kph,
        pm25,
        observed_at,
    })
}
