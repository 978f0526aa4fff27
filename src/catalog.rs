//! Static registries: selectable cities and ground stations
//!
//! Both registries are built once at startup and shared read-only behind an
//! `Arc` by every selection.

use std::collections::HashSet;

use crate::models::{City, GroundStation};
use crate::{AqMapError, Result};

/// Registry of selectable cities, in presentation order
#[derive(Debug, Clone)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    /// Build a catalog, rejecting duplicate identifiers.
    pub fn new(cities: Vec<City>) -> Result<Self> {
        let mut seen = HashSet::new();
        for city in &cities {
            if !seen.insert(city.id.as_str()) {
                return Err(AqMapError::config(format!(
                    "Duplicate city id '{}' in catalog",
                    city.id
                )));
            }
        }
        Ok(Self { cities })
    }

    /// Catalog of the built-in cities, checked like any other catalog.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_cities())
    }

    /// Look up a city by identifier.
    pub fn get(&self, id: &str) -> Result<&City> {
        self.cities
            .iter()
            .find(|city| city.id == id)
            .ok_or_else(|| AqMapError::unknown_city(id))
    }

    /// Look up a city by identifier or display name.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.matches(key))
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Built-in North American cities, in presentation order
#[must_use]
pub fn builtin_cities() -> Vec<City> {
    vec![
        City::new("los-angeles", "Los Angeles", 34.0522, -118.2437),
        City::new("new-york", "New York", 40.7128, -74.0060),
        City::new("toronto", "Toronto", 43.65107, -79.347015),
        City::new("mexico-city", "Mexico City", 19.4326, -99.1332),
        City::new("vancouver", "Vancouver", 49.2827, -123.1207),
        City::new("chicago", "Chicago", 41.8781, -87.6298),
        City::new("houston", "Houston", 29.7604, -95.3698),
        City::new("miami", "Miami", 25.7617, -80.1918),
    ]
}

/// Fixed list of ground stations shown on the point overlay
#[derive(Debug, Clone, Default)]
pub struct GroundStationRegistry {
    stations: Vec<GroundStation>,
}

impl GroundStationRegistry {
    #[must_use]
    pub fn new(stations: Vec<GroundStation>) -> Self {
        Self { stations }
    }

    #[must_use]
    pub fn stations(&self) -> &[GroundStation] {
        &self.stations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Built-in stations used when the configuration lists none
#[must_use]
pub fn default_ground_stations() -> Vec<GroundStation> {
    [
        ("Los Angeles - North Main Street", 34.0664, -118.2267),
        ("New York - Queens College", 40.7362, -73.8219),
        ("Toronto Downtown", 43.6629, -79.3957),
        ("Mexico City - Merced", 19.4246, -99.1196),
        ("Vancouver - Robson Square", 49.2822, -123.1222),
        ("Chicago - Com Ed", 41.7514, -87.7134),
        ("Houston - Aldine", 29.9011, -95.3261),
        ("Miami - Kendall", 25.7314, -80.3817),
    ]
    .into_iter()
    .map(|(name, lat, lon)| GroundStation {
        name: name.to_string(),
        lat,
        lon,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = CityCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 8);
        let la = catalog.get("los-angeles").unwrap();
        assert_eq!(la.name, "Los Angeles");
        assert_eq!(catalog.find("Los Angeles").unwrap().id, "los-angeles");
    }

    #[test]
    fn test_unknown_city() {
        let catalog = CityCatalog::builtin().unwrap();
        let err = catalog.get("atlantis").unwrap_err();
        assert!(matches!(err, AqMapError::UnknownCity { .. }));
        assert!(catalog.find("Atlantis").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = CityCatalog::new(vec![
            City::new("a", "A", 0.0, 0.0),
            City::new("a", "B", 1.0, 1.0),
        ]);
        assert!(matches!(result, Err(AqMapError::Config { .. })));
    }

    #[test]
    fn test_builtin_catalog_goes_through_validation() {
        let mut cities = builtin_cities();
        cities.push(cities[0].clone());
        assert!(matches!(
            CityCatalog::new(cities),
            Err(AqMapError::Config { .. })
        ));
        assert_eq!(CityCatalog::builtin().unwrap().len(), builtin_cities().len());
    }

    #[test]
    fn test_default_stations() {
        let registry = GroundStationRegistry::new(default_ground_stations());
        assert_eq!(registry.len(), 8);
        assert!(!registry.is_empty());
    }
}
