use thiserror::Error;

/// Errors raised by the geospatial core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid service area configuration: {0}")]
    InvalidConfig(String),
}
