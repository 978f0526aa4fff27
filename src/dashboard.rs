//! Dashboard controller
//!
//! Every selection or toggle event runs one full pass: fetch the reading,
//! classify it, compose the map and publish a [`DisplayState`]. Provider
//! failures degrade the state instead of failing the pass. A newer selection
//! supersedes any pass still in flight; the late result is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::catalog::CityCatalog;
use crate::map::{LayerToggles, MapComposer, MapScene};
use crate::models::{City, ReadingOutcome};
use crate::readings::ReadingSource;
use crate::severity::{SeverityLevel, classify};

/// Everything the render surface needs for one selection
#[derive(Debug, Clone, Serialize)]
pub struct DisplayState {
    pub city: City,
    pub reading: ReadingOutcome,
    pub severity: Option<SeverityLevel>,
    pub scene: MapScene,
    pub error_message: Option<String>,
    pub toggles: LayerToggles,
    /// Name of the reading source that produced `reading`
    pub source: &'static str,
    /// Data-origin notice, e.g. for bundled sample readings
    pub provenance: Option<&'static str>,
    /// Detail panel text, one entry per line
    pub detail: Vec<String>,
    pub retrieved_at: DateTime<Utc>,
}

impl DisplayState {
    #[allow(clippy::too_many_arguments)]
    fn new(
        city: City,
        reading: ReadingOutcome,
        severity: Option<SeverityLevel>,
        scene: MapScene,
        error_message: Option<String>,
        toggles: LayerToggles,
        source: &'static str,
        provenance: Option<&'static str>,
    ) -> Self {
        let mut detail = detail_lines(&reading, error_message.is_some());
        detail.extend(provenance.map(str::to_string));
        Self {
            city,
            reading,
            severity,
            scene,
            error_message,
            toggles,
            source,
            provenance,
            detail,
            retrieved_at: Utc::now(),
        }
    }
}

fn detail_lines(reading: &ReadingOutcome, failed: bool) -> Vec<String> {
    let Some(r) = reading.reading() else {
        return vec![if failed {
            "Air quality data unavailable".to_string()
        } else {
            "No recent data available".to_string()
        }];
    };

    let mut lines = vec![
        format!("Air Quality Index (AQI): {}", r.aqi),
        format!("Forecast: {}", r.forecast_label),
    ];
    lines.extend(r.format_temperature().map(|t| format!("Temperature: {t}")));
    lines.extend(r.format_humidity().map(|h| format!("Humidity: {h}")));
    lines.extend(r.format_wind().map(|w| format!("Wind: {w}")));
    lines.extend(r.format_pm25().map(|p| format!("PM2.5: {p}")));
    lines
}

/// Result of a selection pass
#[derive(Debug, Clone)]
pub enum Selection {
    /// The pass was current when it finished and its state is now displayed
    Applied(DisplayState),
    /// A newer selection started while this one was in flight
    Superseded,
}

impl Selection {
    #[must_use]
    pub fn applied(self) -> Option<DisplayState> {
        match self {
            Selection::Applied(state) => Some(state),
            Selection::Superseded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
}

/// Settles its pass when dropped, however the pass ends: applied, failed,
/// superseded, or cancelled mid-fetch.
struct PassGuard<'a> {
    generation: &'a AtomicU64,
    settled: &'a AtomicU64,
    pass: u64,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        // Only the newest pass may return the dashboard to idle.
        if self.generation.load(Ordering::SeqCst) == self.pass {
            self.settled.fetch_max(self.pass, Ordering::SeqCst);
        }
    }
}

/// Orchestrates fetch, classification and composition per selection
pub struct DashboardController {
    catalog: Arc<CityCatalog>,
    source: Arc<dyn ReadingSource>,
    composer: Arc<MapComposer>,
    generation: AtomicU64,
    /// Generation of the last pass that ended while current
    settled: AtomicU64,
    displayed: Mutex<Option<DisplayState>>,
}

impl DashboardController {
    #[must_use]
    pub fn new(
        catalog: Arc<CityCatalog>,
        source: Arc<dyn ReadingSource>,
        composer: Arc<MapComposer>,
    ) -> Self {
        Self {
            catalog,
            source,
            composer,
            generation: AtomicU64::new(0),
            settled: AtomicU64::new(0),
            displayed: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    /// The last applied state; stays visible while a newer pass is loading.
    pub async fn current(&self) -> Option<DisplayState> {
        self.displayed.lock().await.clone()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.generation.load(Ordering::SeqCst) > self.settled.load(Ordering::SeqCst) {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    /// Run one selection pass for `city_id` with the given layer toggles.
    ///
    /// # Errors
    /// Unknown city ids and invalid readings propagate. Provider failures do
    /// not: they produce a state with `NoData` and an error message.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn on_selection_changed(
        &self,
        city_id: &str,
        toggles: LayerToggles,
    ) -> Result<Selection> {
        let city = self.catalog.get(city_id)?.clone();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = PassGuard {
            generation: &self.generation,
            settled: &self.settled,
            pass: generation,
        };
        debug!("Selection pass {} started", generation);

        let (reading, error_message) = match self.source.fetch(&city).await {
            Ok(reading) => (reading, None),
            Err(e) if e.is_recoverable() => {
                warn!("Reading unavailable for {}: {}", city.name, e);
                (ReadingOutcome::NoData, Some(e.user_message()))
            }
            Err(e) => return Err(e),
        };

        let severity = reading
            .reading()
            .map(|r| classify(i64::from(r.aqi)))
            .transpose()?;

        let scene = self
            .composer
            .compose(&city, &reading, severity.as_ref(), &toggles);
        let state = DisplayState::new(
            city,
            reading,
            severity,
            scene,
            error_message,
            toggles,
            self.source.name(),
            self.source.provenance(),
        );

        let mut displayed = self.displayed.lock().await;
        if generation != self.generation.load(Ordering::SeqCst) {
            info!(
                "Discarding result for {}: superseded by a newer selection",
                state.city.name
            );
            return Ok(Selection::Superseded);
        }

        *displayed = Some(state.clone());
        info!(
            "Displaying {} (AQI {})",
            state.city.name,
            state
                .reading
                .reading()
                .map_or_else(|| "n/a".to_string(), |r| r.aqi.to_string())
        );
        Ok(Selection::Applied(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AqMapError;
    use crate::catalog::{GroundStationRegistry, default_ground_stations};
    use crate::config::{BaseMapConfig, SatelliteConfig};
    use crate::map::{MapLayer, WmsOverlaySource};
    use crate::readings::SampleReadingSource;
    use crate::readings::sample::SAMPLE_PROVENANCE;
    use crate::severity::{NEUTRAL_MARKER_COLOR, SeverityColor};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct FailingSource;

    #[async_trait]
    impl ReadingSource for FailingSource {
        async fn fetch(&self, _city: &City) -> Result<ReadingOutcome> {
            Err(AqMapError::provider("request timed out after 10s"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct EmptySource;

    #[async_trait]
    impl ReadingSource for EmptySource {
        async fn fetch(&self, _city: &City) -> Result<ReadingOutcome> {
            Ok(ReadingOutcome::NoData)
        }

        fn name(&self) -> &'static str {
            "empty"
        }
    }

    /// Holds fetches for `gated_city` until released
    struct GatedSource {
        gated_city: &'static str,
        entered: Notify,
        release: Notify,
        inner: SampleReadingSource,
    }

    #[async_trait]
    impl ReadingSource for GatedSource {
        async fn fetch(&self, city: &City) -> Result<ReadingOutcome> {
            if city.id == self.gated_city {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.fetch(city).await
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    fn sample() -> SampleReadingSource {
        SampleReadingSource::for_catalog(&CityCatalog::builtin().unwrap())
    }

    fn controller(source: Arc<dyn ReadingSource>) -> DashboardController {
        let composer = MapComposer::new(
            &BaseMapConfig::default(),
            Arc::new(WmsOverlaySource::new(&SatelliteConfig::default())),
            Arc::new(GroundStationRegistry::new(default_ground_stations())),
        );
        DashboardController::new(
            Arc::new(CityCatalog::builtin().unwrap()),
            source,
            Arc::new(composer),
        )
    }

    #[tokio::test]
    async fn test_sample_selection() {
        let dashboard = controller(Arc::new(sample()));
        let state = dashboard
            .on_selection_changed("los-angeles", LayerToggles::default())
            .await
            .unwrap()
            .applied()
            .unwrap();

        assert_eq!(state.city.name, "Los Angeles");
        assert_eq!(state.reading.reading().unwrap().aqi, 120);
        assert_eq!(state.severity.unwrap().color, SeverityColor::Sensitive);
        assert!(state.error_message.is_none());
        assert_eq!(state.detail[0], "Air Quality Index (AQI): 120");
        assert_eq!(state.detail[1], "Forecast: Unhealthy for Sensitive Groups");
        assert!(state.detail.contains(&"Temperature: 28 °C".to_string()));
        assert!(state.detail.contains(&"Humidity: 30 %".to_string()));
        assert_eq!(state.source, "sample");
        assert_eq!(state.provenance, Some(SAMPLE_PROVENANCE));
        assert_eq!(state.detail.last().unwrap(), SAMPLE_PROVENANCE);
        assert_eq!(dashboard.phase(), Phase::Idle);
        assert_eq!(dashboard.current().await.unwrap().city.id, "los-angeles");
    }

    #[tokio::test]
    async fn test_unknown_city_propagates() {
        let dashboard = controller(Arc::new(sample()));
        let err = dashboard
            .on_selection_changed("atlantis", LayerToggles::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AqMapError::UnknownCity { .. }));
        assert_eq!(dashboard.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_no_data_is_not_an_error() {
        let dashboard = controller(Arc::new(EmptySource));
        let state = dashboard
            .on_selection_changed("toronto", LayerToggles::default())
            .await
            .unwrap()
            .applied()
            .unwrap();

        assert!(state.reading.is_no_data());
        assert!(state.error_message.is_none());
        assert!(state.severity.is_none());
        assert_eq!(state.source, "empty");
        assert!(state.provenance.is_none());
        assert_eq!(state.detail, vec!["No recent data available".to_string()]);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades() {
        let dashboard = controller(Arc::new(FailingSource));
        let state = dashboard
            .on_selection_changed("miami", LayerToggles::new(false, false))
            .await
            .unwrap()
            .applied()
            .unwrap();

        assert!(state.reading.is_no_data());
        assert!(state.error_message.is_some());
        assert!(state.severity.is_none());
        assert!(matches!(state.scene.layers[0], MapLayer::BaseTile(_)));
        assert_eq!(state.scene.focal_marker().unwrap().color, NEUTRAL_MARKER_COLOR);
        assert_eq!(state.detail, vec!["Air quality data unavailable".to_string()]);
    }

    #[tokio::test]
    async fn test_late_result_is_discarded() {
        let source = Arc::new(GatedSource {
            gated_city: "los-angeles",
            entered: Notify::new(),
            release: Notify::new(),
            inner: sample(),
        });
        let dashboard = Arc::new(controller(source.clone()));

        let first = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .on_selection_changed("los-angeles", LayerToggles::default())
                    .await
            })
        };
        source.entered.notified().await;
        assert_eq!(dashboard.phase(), Phase::Loading);

        let second = dashboard
            .on_selection_changed("toronto", LayerToggles::default())
            .await
            .unwrap();
        assert!(matches!(second, Selection::Applied(_)));

        source.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, Selection::Superseded));

        assert_eq!(dashboard.current().await.unwrap().city.id, "toronto");
        assert_eq!(dashboard.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_prior_state_visible_while_loading() {
        let source = Arc::new(GatedSource {
            gated_city: "miami",
            entered: Notify::new(),
            release: Notify::new(),
            inner: sample(),
        });
        let dashboard = Arc::new(controller(source.clone()));
        dashboard
            .on_selection_changed("chicago", LayerToggles::default())
            .await
            .unwrap();

        let pending = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .on_selection_changed("miami", LayerToggles::default())
                    .await
            })
        };
        source.entered.notified().await;
        assert_eq!(dashboard.phase(), Phase::Loading);
        assert_eq!(dashboard.current().await.unwrap().city.id, "chicago");

        source.release.notify_one();
        pending.await.unwrap().unwrap();
        assert_eq!(dashboard.current().await.unwrap().city.id, "miami");
    }

    /// Never answers; stands in for a fetch that hangs until cancelled
    struct StalledSource {
        entered: Notify,
    }

    #[async_trait]
    impl ReadingSource for StalledSource {
        async fn fetch(&self, _city: &City) -> Result<ReadingOutcome> {
            self.entered.notify_one();
            std::future::pending::<Result<ReadingOutcome>>().await
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_cancelled_pass_returns_to_idle() {
        let source = Arc::new(StalledSource {
            entered: Notify::new(),
        });
        let dashboard = Arc::new(controller(source.clone()));

        let pass = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .on_selection_changed("vancouver", LayerToggles::default())
                    .await
            })
        };
        source.entered.notified().await;
        assert_eq!(dashboard.phase(), Phase::Loading);

        pass.abort();
        assert!(pass.await.unwrap_err().is_cancelled());
        assert_eq!(dashboard.phase(), Phase::Idle);
        assert!(dashboard.current().await.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_stale_pass_keeps_newer_loading() {
        let source = Arc::new(GatedSource {
            gated_city: "houston",
            entered: Notify::new(),
            release: Notify::new(),
            inner: sample(),
        });
        let dashboard = Arc::new(controller(source.clone()));

        let newer = {
            let dashboard = dashboard.clone();
            tokio::spawn(async move {
                dashboard
                    .on_selection_changed("houston", LayerToggles::default())
                    .await
            })
        };
        source.entered.notified().await;

        // A dropped future for an older generation must not settle the newer one.
        let stale = PassGuard {
            generation: &dashboard.generation,
            settled: &dashboard.settled,
            pass: 0,
        };
        drop(stale);
        assert_eq!(dashboard.phase(), Phase::Loading);

        source.release.notify_one();
        newer.await.unwrap().unwrap();
        assert_eq!(dashboard.phase(), Phase::Idle);
    }
}
