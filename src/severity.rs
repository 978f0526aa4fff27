//! AQI severity classification
//!
//! Maps an Air Quality Index value onto one of four ordered buckets. The
//! buckets partition `[0, ∞)`: every non-negative AQI falls into exactly one.

use serde::{Deserialize, Serialize};

use crate::{AqMapError, Result};

/// Marker color used when no severity is known
pub const NEUTRAL_MARKER_COLOR: &str = "#808080";

/// Severity color category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityColor {
    Good,
    Moderate,
    Sensitive,
    Unhealthy,
}

/// Two-bucket view of the severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoarseColor {
    Green,
    Red,
}

impl SeverityColor {
    /// Hex color for map markers (EPA AQI palette)
    #[must_use]
    pub fn marker_hex(self) -> &'static str {
        match self {
            SeverityColor::Good => "#00e400",
            SeverityColor::Moderate => "#ffff00",
            SeverityColor::Sensitive => "#ff7e00",
            SeverityColor::Unhealthy => "#ff0000",
        }
    }

    /// Collapse to the green/red scheme (AQI above 100 is red)
    #[must_use]
    pub fn coarse(self) -> CoarseColor {
        match self {
            SeverityColor::Good | SeverityColor::Moderate => CoarseColor::Green,
            SeverityColor::Sensitive | SeverityColor::Unhealthy => CoarseColor::Red,
        }
    }
}

/// One bucket of the severity scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityLevel {
    pub label: &'static str,
    pub color: SeverityColor,
    pub min_aqi: u32,
    /// Inclusive upper bound; `None` means unbounded
    pub max_aqi: Option<u32>,
}

impl SeverityLevel {
    #[must_use]
    pub fn contains(&self, aqi: u32) -> bool {
        aqi >= self.min_aqi && self.max_aqi.is_none_or(|max| aqi <= max)
    }
}

/// Ordered, contiguous severity table
pub const SEVERITY_LEVELS: [SeverityLevel; 4] = [
    SeverityLevel {
        label: "Good",
        color: SeverityColor::Good,
        min_aqi: 0,
        max_aqi: Some(50),
    },
    SeverityLevel {
        label: "Moderate",
        color: SeverityColor::Moderate,
        min_aqi: 51,
        max_aqi: Some(100),
    },
    SeverityLevel {
        label: "Unhealthy for Sensitive Groups",
        color: SeverityColor::Sensitive,
        min_aqi: 101,
        max_aqi: Some(150),
    },
    SeverityLevel {
        label: "Unhealthy",
        color: SeverityColor::Unhealthy,
        min_aqi: 151,
        max_aqi: None,
    },
];

/// Classify an AQI value.
///
/// # Errors
/// Returns [`AqMapError::InvalidInput`] for negative values.
pub fn classify(aqi: i64) -> Result<SeverityLevel> {
    if aqi < 0 {
        return Err(AqMapError::invalid_input(format!(
            "AQI must be non-negative, got {aqi}"
        )));
    }
    let aqi = u32::try_from(aqi).unwrap_or(u32::MAX);
    Ok(classify_unsigned(aqi))
}

/// Classify an AQI that is non-negative by construction.
#[must_use]
pub fn classify_unsigned(aqi: u32) -> SeverityLevel {
    match aqi {
        0..=50 => SEVERITY_LEVELS[0],
        51..=100 => SEVERITY_LEVELS[1],
        101..=150 => SEVERITY_LEVELS[2],
        _ => SEVERITY_LEVELS[3],
    }
}
