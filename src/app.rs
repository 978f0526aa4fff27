//! Application wiring: builds the shared registries, the reading source and
//! the dashboard controller from configuration.

use std::sync::Arc;

use tracing::info;

use crate::Result;
use crate::catalog::{CityCatalog, GroundStationRegistry};
use crate::config::AqMapConfig;
use crate::dashboard::DashboardController;
use crate::map::{MapComposer, WmsOverlaySource};
use crate::readings;

/// Fully wired application
pub struct App {
    pub dashboard: Arc<DashboardController>,
    pub overlay: Arc<WmsOverlaySource>,
}

impl App {
    /// Build the application. The provider credential is taken from the
    /// loaded configuration and handed to the reading source explicitly.
    pub fn from_config(config: &AqMapConfig) -> Result<Self> {
        let catalog = Arc::new(CityCatalog::builtin()?);
        let stations = Arc::new(GroundStationRegistry::new(config.ground_stations.clone()));
        let overlay = Arc::new(WmsOverlaySource::new(&config.satellite));
        let composer = Arc::new(MapComposer::new(
            &config.base_map,
            overlay.clone(),
            stations.clone(),
        ));
        let source = readings::from_config(
            &config.provider,
            config.provider.api_key.clone(),
            &catalog,
        )?;

        info!(
            "Dashboard ready: {} cities, {} ground stations, '{}' reading source",
            catalog.len(),
            stations.len(),
            source.name()
        );

        Ok(Self {
            dashboard: Arc::new(DashboardController::new(catalog, source, composer)),
            overlay,
        })
    }
}
