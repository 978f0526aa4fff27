//! City and ground station models with geographic coordinates

use serde::{Deserialize, Serialize};

/// A selectable city from the catalog
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct City {
    /// Stable identifier, unique within a catalog
    pub id: String,
    /// Display name, also used as the provider lookup key
    pub name: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

impl City {
    /// Create a new city
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
        }
    }

    /// Whether `key` names this city, by id or case-insensitive display name
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name.eq_ignore_ascii_case(key.trim())
    }
}

/// A fixed-location sensor shown on the ground-station overlay
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GroundStation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}
