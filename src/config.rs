//! Configuration management for the `aqmap` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AqMapError;
use crate::catalog::default_ground_stations;
use crate::models::GroundStation;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `aqmap` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AqMapConfig {
    /// Air quality provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Satellite raster overlay descriptor
    #[serde(default)]
    pub satellite: SatelliteConfig,
    /// Base map tiles
    #[serde(default)]
    pub base_map: BaseMapConfig,
    /// Ground stations shown on the point overlay
    #[serde(default = "default_ground_stations")]
    pub ground_stations: Vec<GroundStation>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which reading source backs the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStrategy {
    /// Bundled sample table
    #[default]
    Sample,
    /// External air quality provider
    Live,
}

/// Air quality provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub strategy: ProviderStrategy,
    /// Bearer token for the live provider
    pub api_key: Option<String>,
    /// Measurements endpoint of the live provider
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// Number of most recent measurements to request
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

/// Satellite overlay descriptor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// WMS endpoint URL
    #[serde(default = "default_satellite_endpoint")]
    pub endpoint: String,
    /// WMS layer name
    #[serde(default = "default_satellite_layer")]
    pub layer: String,
    /// Image MIME type
    #[serde(default = "default_satellite_format")]
    pub format: String,
    #[serde(default = "default_true")]
    pub transparent: bool,
    #[serde(default = "default_satellite_attribution")]
    pub attribution: String,
    /// Probe the endpoint at startup and drop the overlay if unreachable
    #[serde(default = "default_true")]
    pub probe_on_startup: bool,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u32,
}

/// Base map tile settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseMapConfig {
    /// XYZ tile URL template
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    #[serde(default = "default_tile_attribution")]
    pub attribution: String,
    /// Initial zoom level around the selected city
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_provider_base_url() -> String {
    "https://api.openaq.org/v2/measurements".to_string()
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_result_limit() -> u32 {
    5
}

fn default_satellite_endpoint() -> String {
    "https://gibs.earthdata.nasa.gov/wms/epsg3857/best/wms.cgi".to_string()
}

fn default_satellite_layer() -> String {
    "OMI_Nitrogen_Dioxide_Tropo_Column".to_string()
}

fn default_satellite_format() -> String {
    "image/png".to_string()
}

fn default_satellite_attribution() -> String {
    "NASA GIBS".to_string()
}

fn default_probe_timeout() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_tile_url() -> String {
    "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_tile_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_zoom() -> u8 {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            strategy: ProviderStrategy::default(),
            api_key: None,
            base_url: default_provider_base_url(),
            timeout_seconds: default_provider_timeout(),
            result_limit: default_result_limit(),
        }
    }
}

impl ProviderConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_satellite_endpoint(),
            layer: default_satellite_layer(),
            format: default_satellite_format(),
            transparent: true,
            attribution: default_satellite_attribution(),
            probe_on_startup: true,
            probe_timeout_seconds: default_probe_timeout(),
        }
    }
}

impl Default for BaseMapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_tile_attribution(),
            zoom: default_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for AqMapConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            satellite: SatelliteConfig::default(),
            base_map: BaseMapConfig::default(),
            ground_stations: default_ground_stations(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AqMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AQMAP_PROVIDER__API_KEY overrides provider.api_key
        builder = builder.add_source(
            Environment::with_prefix("AQMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AqMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aqmap").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.provider.base_url.is_empty() {
            self.provider.base_url = default_provider_base_url();
        }
        if self.provider.timeout_seconds == 0 {
            self.provider.timeout_seconds = default_provider_timeout();
        }
        if self.provider.result_limit == 0 {
            self.provider.result_limit = default_result_limit();
        }
        if self.satellite.probe_timeout_seconds == 0 {
            self.satellite.probe_timeout_seconds = default_probe_timeout();
        }
        if self.base_map.tile_url.is_empty() {
            self.base_map.tile_url = default_tile_url();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.ground_stations.is_empty() {
            self.ground_stations = default_ground_stations();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match &self.provider.api_key {
            Some(api_key) if api_key.trim().is_empty() => {
                return Err(AqMapError::config(
                    "Provider API key cannot be empty if provided. Either remove it or provide a valid key."
                ).into());
            }
            None if self.provider.strategy == ProviderStrategy::Live => {
                return Err(AqMapError::config(
                    "The live provider strategy requires provider.api_key (or AQMAP_PROVIDER__API_KEY)",
                )
                .into());
            }
            _ => {}
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.timeout_seconds > 300 {
            return Err(AqMapError::config("Provider timeout cannot exceed 300 seconds").into());
        }

        if self.provider.result_limit > 100 {
            return Err(AqMapError::config("Provider result limit cannot exceed 100").into());
        }

        if self.satellite.probe_timeout_seconds > 60 {
            return Err(
                AqMapError::config("Satellite probe timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.base_map.zoom > 19 {
            return Err(AqMapError::config("Base map zoom cannot exceed 19").into());
        }

        for station in &self.ground_stations {
            if !(-90.0..=90.0).contains(&station.lat) || !(-180.0..=180.0).contains(&station.lon) {
                return Err(AqMapError::config(format!(
                    "Ground station '{}' has invalid coordinates",
                    station.name
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AqMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AqMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, value) in [
            ("Provider base URL", &self.provider.base_url),
            ("Base map tile URL", &self.base_map.tile_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(
                    AqMapError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into(),
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AqMapConfig::default();
        assert_eq!(config.provider.strategy, ProviderStrategy::Sample);
        assert_eq!(config.provider.timeout_seconds, 10);
        assert_eq!(config.provider.result_limit, 5);
        assert_eq!(config.base_map.zoom, 6);
        assert_eq!(config.logging.level, "info");
        assert!(config.provider.api_key.is_none());
        assert!(!config.ground_stations.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = AqMapConfig::default();
        config.provider.api_key = Some("   ".to_string());
        assert!(config.validate_api_keys().is_err());
    }

    #[test]
    fn test_live_strategy_requires_api_key() {
        let mut config = AqMapConfig::default();
        config.provider.strategy = ProviderStrategy::Live;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("requires provider.api_key"));

        config.provider.api_key = Some("token".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_strategy_needs_no_api_key() {
        let config = AqMapConfig::default();
        assert!(config.provider.api_key.is_none());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AqMapConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AqMapConfig::default();
        config.provider.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_station_coordinates() {
        let mut config = AqMapConfig::default();
        config.ground_stations.push(GroundStation {
            name: "Nowhere".to_string(),
            lat: 123.0,
            lon: 0.0,
        });
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Nowhere"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = AqMapConfig::default();
        config.provider.timeout_seconds = 0;
        config.provider.base_url.clear();
        config.apply_defaults();
        assert_eq!(config.provider.timeout_seconds, 10);
        assert_eq!(config.provider.base_url, "https://api.openaq.org/v2/measurements");
    }

    #[test]
    fn test_empty_station_list_falls_back_to_builtin() {
        let mut config = AqMapConfig::default();
        config.ground_stations.clear();
        config.apply_defaults();
        assert_eq!(config.ground_stations, default_ground_stations());
    }

    #[test]
    fn test_load_empty_station_list_from_toml() {
        let path = std::env::temp_dir().join(format!(
            "aqmap-config-empty-stations-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "ground_stations = []\n").unwrap();

        let config = AqMapConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.ground_stations.len(), default_ground_stations().len());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("aqmap-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[provider]
strategy = "live"
api_key = "secret-token"
timeout_seconds = 3

[[ground_stations]]
name = "Only Station"
lat = 10.0
lon = 20.0
"#
        )
        .unwrap();

        let config = AqMapConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.provider.strategy, ProviderStrategy::Live);
        assert_eq!(config.provider.api_key.as_deref(), Some("secret-token"));
        assert_eq!(config.provider.timeout(), Duration::from_secs(3));
        assert_eq!(config.ground_stations.len(), 1);
        assert_eq!(config.satellite.format, "image/png");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AqMapConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("aqmap"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
