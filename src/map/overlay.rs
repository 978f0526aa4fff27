//! Satellite raster overlay source
//!
//! The overlay is a declarative WMS descriptor; raster content is never
//! parsed here. A source can be invalid (bad descriptor) or unreachable
//! (failed startup probe), in which case the composer leaves it out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::config::SatelliteConfig;
use crate::{AqMapError, Result};

/// WMS raster overlay descriptor handed to the render surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RasterOverlay {
    pub endpoint: String,
    pub layer: String,
    pub format: String,
    pub transparent: bool,
    pub attribution: String,
}

/// A type that can provide the satellite overlay descriptor.
pub trait OverlaySource: Send + Sync {
    /// Resolve the overlay, or report why it cannot be shown.
    fn resolve(&self) -> Result<RasterOverlay>;
}

/// Overlay backed by a WMS endpoint from configuration
pub struct WmsOverlaySource {
    descriptor: RasterOverlay,
    invalid: Option<String>,
    reachable: AtomicBool,
    probe_timeout: Duration,
}

impl WmsOverlaySource {
    #[must_use]
    pub fn new(config: &SatelliteConfig) -> Self {
        let descriptor = RasterOverlay {
            endpoint: config.endpoint.clone(),
            layer: config.layer.clone(),
            format: config.format.clone(),
            transparent: config.transparent,
            attribution: config.attribution.clone(),
        };
        let invalid = validate(&descriptor).err();
        if let Some(reason) = &invalid {
            warn!("Satellite overlay disabled: {}", reason);
        }

        Self {
            descriptor,
            invalid,
            reachable: AtomicBool::new(true),
            probe_timeout: Duration::from_secs(config.probe_timeout_seconds.into()),
        }
    }

    /// Ask the endpoint for its capabilities; mark the overlay unreachable on failure.
    ///
    /// Returns whether the overlay is usable afterwards.
    pub async fn probe(&self) -> bool {
        if self.invalid.is_some() {
            return false;
        }

        let url = format!(
            "{}{}SERVICE=WMS&REQUEST=GetCapabilities",
            self.descriptor.endpoint,
            if self.descriptor.endpoint.contains('?') { "&" } else { "?" }
        );

        let outcome = match Client::builder().timeout(self.probe_timeout).build() {
            Ok(client) => client.get(&url).send().await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let reachable = match outcome {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Satellite overlay probe returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("Satellite overlay probe failed: {}", e);
                false
            }
        };

        if reachable {
            info!("Satellite overlay '{}' is reachable", self.descriptor.layer);
            self.reachable.store(true, Ordering::Relaxed);
        } else {
            self.mark_unreachable();
        }
        reachable
    }

    /// Drop the overlay from composed scenes until the next successful probe.
    pub fn mark_unreachable(&self) {
        self.reachable.store(false, Ordering::Relaxed);
    }
}

impl OverlaySource for WmsOverlaySource {
    fn resolve(&self) -> Result<RasterOverlay> {
        if let Some(reason) = &self.invalid {
            return Err(AqMapError::overlay(reason.clone()));
        }
        if !self.reachable.load(Ordering::Relaxed) {
            return Err(AqMapError::overlay(format!(
                "{} did not answer the capabilities probe",
                self.descriptor.endpoint
            )));
        }
        Ok(self.descriptor.clone())
    }
}

fn validate(descriptor: &RasterOverlay) -> std::result::Result<(), String> {
    let url = Url::parse(&descriptor.endpoint)
        .map_err(|e| format!("invalid endpoint '{}': {e}", descriptor.endpoint))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("endpoint '{}' is not HTTP(S)", descriptor.endpoint));
    }
    if descriptor.layer.trim().is_empty() {
        return Err("layer name is empty".to_string());
    }
    if !descriptor.format.starts_with("image/") {
        return Err(format!("'{}' is not an image format", descriptor.format));
    }
    Ok(())
}
