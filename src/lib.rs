//! `aqmap` - Air quality severity encoding and map composition
//!
//! This library turns per-city air quality readings into a severity bucket,
//! composes a layered map scene around the selected city and keeps a detail
//! panel in sync with the current selection.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod map;
pub mod models;
pub mod readings;
pub mod severity;
pub mod web;

// Re-export core types for public API
pub use app::App;
pub use catalog::{CityCatalog, GroundStationRegistry};
pub use config::AqMapConfig;
pub use dashboard::{DashboardController, DisplayState, Phase, Selection};
pub use error::AqMapError;
pub use map::{LayerToggles, MapComposer, MapLayer, MapScene};
pub use models::{City, GroundStation, Reading, ReadingOutcome};
pub use readings::{OpenAqReadingSource, ReadingSource, SampleReadingSource};
pub use severity::{SeverityColor, SeverityLevel, classify};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AqMapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
