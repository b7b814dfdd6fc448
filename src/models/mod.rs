// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    require_location, AreaCounts, BoundingBox, ChainCoverage, ChainDistances, Coordinate,
    CoverageResult, DecisionBands, Entity, EstimatedTimes, Geofence, LocationFields, NearbyEntity,
    ScoreBreakdown, ScoringWeights, ServiceArea, ValidationResult, ValidationStatus,
};
pub use requests::{
    AreaStatisticsRequest, AreaValidationRequest, CalculateDistanceRequest, NearbyPartnersRequest,
    NearbyVendorsRequest, ValidateCoverageRequest,
};
pub use responses::{
    AreaStatisticsResponse, DistanceResponse, ErrorResponse, HealthResponse, NearbyErrorResponse,
    NearbyPartnersResponse, NearbyVendorsResponse,
};
