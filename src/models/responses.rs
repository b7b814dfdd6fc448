use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::domain::{AreaCounts, LocationFields, NearbyEntity};

/// Response for the distance endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResponse {
    pub distance_km: f64,
    pub within_service_area: bool,
    pub service_radius_km: f64,
}

/// Response for the nearby vendors endpoint
#[derive(Debug, Clone, Serialize)]
pub struct NearbyVendorsResponse {
    pub customer_location: LocationFields,
    pub service_radius_km: f64,
    pub total_vendors_found: usize,
    pub nearby_vendors: Vec<NearbyEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<Value>,
}

/// Response for the nearby delivery partners endpoint
#[derive(Debug, Clone, Serialize)]
pub struct NearbyPartnersResponse {
    pub pickup_location: LocationFields,
    pub service_radius_km: f64,
    pub total_partners_found: usize,
    pub nearby_partners: Vec<NearbyEntity>,
    pub recommendation: Option<NearbyEntity>,
}

/// Returned by the nearby endpoints when the center point is unusable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby_vendors: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby_partners: Option<Vec<Value>>,
}

/// Response for the area statistics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct AreaStatisticsResponse {
    pub area_center: LocationFields,
    pub service_radius_km: f64,
    pub statistics: AreaCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<Value>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service_area: String,
    pub inference_backend: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
