//! Local Loop geospatial service
//!
//! Decides whether addresses fall inside a hyperlocal service area, finds
//! vendors and delivery partners within the service radius of a point, and
//! checks that a customer, vendor and delivery partner chain stays in range.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    haversine_distance, AreaStatistics, ConfidenceScorer, CoverageValidator, GeoError, Matcher,
};
pub use models::{
    Coordinate, CoverageResult, Entity, LocationFields, NearbyEntity, ServiceArea,
    ValidationResult, ValidationStatus,
};
pub use services::{InferenceBackend, InferenceError, InferenceProvider};
