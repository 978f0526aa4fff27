//! Map scene composition
//!
//! A [`MapScene`] is an ordered layer list. Order is stacking order:
//! base tiles first, then the satellite raster, then ground-station markers,
//! and the focal city marker last so it draws on top.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::catalog::GroundStationRegistry;
use crate::config::BaseMapConfig;
use crate::models::{City, ReadingOutcome};
use crate::severity::{NEUTRAL_MARKER_COLOR, SeverityColor, SeverityLevel};

pub mod overlay;

pub use overlay::{OverlaySource, RasterOverlay, WmsOverlaySource};

/// Toggleable data layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    SatelliteOverlay,
    GroundStationOverlay,
}

/// Visibility of one data layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerToggle {
    pub kind: LayerKind,
    pub visible: bool,
}

/// Visibility of every data layer; both are on by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerToggles {
    pub satellite_overlay: bool,
    pub ground_station_overlay: bool,
}

impl Default for LayerToggles {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl LayerToggles {
    #[must_use]
    pub fn new(satellite_overlay: bool, ground_station_overlay: bool) -> Self {
        Self {
            satellite_overlay,
            ground_station_overlay,
        }
    }

    /// Defaults overridden by each toggle in order.
    #[must_use]
    pub fn from_toggles(toggles: &[LayerToggle]) -> Self {
        let mut result = Self::default();
        for toggle in toggles {
            result.set(toggle.kind, toggle.visible);
        }
        result
    }

    pub fn set(&mut self, kind: LayerKind, visible: bool) {
        match kind {
            LayerKind::SatelliteOverlay => self.satellite_overlay = visible,
            LayerKind::GroundStationOverlay => self.ground_station_overlay = visible,
        }
    }

    #[must_use]
    pub fn is_visible(&self, kind: LayerKind) -> bool {
        match kind {
            LayerKind::SatelliteOverlay => self.satellite_overlay,
            LayerKind::GroundStationOverlay => self.ground_station_overlay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseTileLayer {
    pub tile_url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// The selected city's marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocalMarker {
    pub lat: f64,
    pub lon: f64,
    /// Hex marker color
    pub color: String,
    /// Severity bucket behind `color`, if known
    pub severity: Option<SeverityColor>,
    pub tooltip: String,
    /// Multi-line popup text
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapLayer {
    BaseTile(BaseTileLayer),
    RasterOverlay(RasterOverlay),
    StationMarker(StationMarker),
    FocalMarker(FocalMarker),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub layers: Vec<MapLayer>,
    /// Requested pieces that could not be shown
    pub notices: Vec<String>,
}

impl MapScene {
    #[must_use]
    pub fn focal_marker(&self) -> Option<&FocalMarker> {
        self.layers.iter().rev().find_map(|layer| match layer {
            MapLayer::FocalMarker(marker) => Some(marker),
            _ => None,
        })
    }

    #[must_use]
    pub fn station_markers(&self) -> usize {
        self.layers
            .iter()
            .filter(|layer| matches!(layer, MapLayer::StationMarker(_)))
            .count()
    }

    #[must_use]
    pub fn has_raster_overlay(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, MapLayer::RasterOverlay(_)))
    }
}

/// Builds map scenes from a city, its reading and the layer toggles
pub struct MapComposer {
    base: BaseTileLayer,
    zoom: u8,
    overlay: Arc<dyn OverlaySource>,
    stations: Arc<GroundStationRegistry>,
}

impl MapComposer {
    #[must_use]
    pub fn new(
        base_map: &BaseMapConfig,
        overlay: Arc<dyn OverlaySource>,
        stations: Arc<GroundStationRegistry>,
    ) -> Self {
        Self {
            base: BaseTileLayer {
                tile_url: base_map.tile_url.clone(),
                attribution: base_map.attribution.clone(),
            },
            zoom: base_map.zoom,
            overlay,
            stations,
        }
    }

    /// Compose the scene. Missing optional pieces are omitted, never fatal.
    #[instrument(skip_all, fields(city = %city.id))]
    pub fn compose(
        &self,
        city: &City,
        reading: &ReadingOutcome,
        severity: Option<&SeverityLevel>,
        toggles: &LayerToggles,
    ) -> MapScene {
        let mut layers = vec![MapLayer::BaseTile(self.base.clone())];
        let mut notices = Vec::new();

        if toggles.is_visible(LayerKind::SatelliteOverlay) {
            match self.overlay.resolve() {
                Ok(raster) => layers.push(MapLayer::RasterOverlay(raster)),
                Err(e) => {
                    warn!("Omitting satellite overlay: {}", e);
                    notices.push("Satellite overlay unavailable".to_string());
                }
            }
        }

        if toggles.is_visible(LayerKind::GroundStationOverlay) {
            layers.extend(self.stations.stations().iter().map(|station| {
                MapLayer::StationMarker(StationMarker {
                    name: station.name.clone(),
                    lat: station.lat,
                    lon: station.lon,
                })
            }));
        }

        layers.push(MapLayer::FocalMarker(focal_marker(city, reading, severity)));
        debug!("Composed scene with {} layers", layers.len());

        MapScene {
            center_lat: city.lat,
            center_lon: city.lon,
            zoom: self.zoom,
            layers,
            notices,
        }
    }
}

fn focal_marker(
    city: &City,
    reading: &ReadingOutcome,
    severity: Option<&SeverityLevel>,
) -> FocalMarker {
    let mut lines = vec![city.name.clone()];
    match reading.reading() {
        Some(r) => lines.push(format!("AQI: {}", r.aqi)),
        None => lines.push("AQI: unavailable".to_string()),
    }
    if let Some(level) = severity {
        lines.push(format!("Level: {}", level.label));
    }
    if let Some(r) = reading.reading() {
        lines.extend(r.format_temperature().map(|t| format!("Temperature: {t}")));
        lines.extend(r.format_pm25().map(|p| format!("PM2.5: {p}")));
    }

    FocalMarker {
        lat: city.lat,
        lon: city.lon,
        color: severity
            .map_or(NEUTRAL_MARKER_COLOR, |level| level.color.marker_hex())
            .to_string(),
        severity: severity.map(|level| level.color),
        tooltip: city.name.clone(),
        label: lines.join("\n"),
    }
}
