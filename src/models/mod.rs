//! Data models for the aqmap engine
//!
//! This module contains the core domain models organized by concern:
//! - City: catalog entries and ground stations with coordinates
//! - Reading: normalized air quality and weather measurements

pub mod city;
pub mod reading;

// Re-export all public types for convenient access
pub use city::{City, GroundStation};
pub use reading::{Reading, ReadingOutcome};
