//! Reading sources
//!
//! A [`ReadingSource`] answers "what is the air like in this city right now".
//! Two interchangeable strategies exist:
//! - [`SampleReadingSource`]: bundled in-memory table, no I/O
//! - [`OpenAqReadingSource`]: single bounded request to a live provider

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::catalog::CityCatalog;
use crate::config::{ProviderConfig, ProviderStrategy};
use crate::models::{City, ReadingOutcome};

pub mod aqi;
pub mod openaq;
pub mod sample;

pub use openaq::OpenAqReadingSource;
pub use sample::SampleReadingSource;

/// A type that can fetch the current reading for a city.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch the latest reading for `city`.
    ///
    /// Returns [`ReadingOutcome::NoData`] when the source answered but has
    /// nothing recent to report.
    async fn fetch(&self, city: &City) -> Result<ReadingOutcome>;

    /// Short name used in logs and reported with every display state.
    fn name(&self) -> &'static str;

    /// Notice to show next to readings from this source, if any.
    fn provenance(&self) -> Option<&'static str> {
        None
    }
}

/// Build the reading source selected by configuration.
///
/// The provider credential is passed in explicitly rather than read from
/// the environment.
pub fn from_config(
    provider: &ProviderConfig,
    api_key: Option<String>,
    catalog: &CityCatalog,
) -> Result<Arc<dyn ReadingSource>> {
    let source: Arc<dyn ReadingSource> = match provider.strategy {
        ProviderStrategy::Sample => Arc::new(SampleReadingSource::for_catalog(catalog)),
        ProviderStrategy::Live => Arc::new(OpenAqReadingSource::new(provider, api_key)?),
    };
    Ok(source)
}
