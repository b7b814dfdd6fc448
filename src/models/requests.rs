use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{lenient_f64, Entity, LocationFields};

/// Request to measure the distance between two points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateDistanceRequest {
    pub location1: Option<LocationFields>,
    pub location2: Option<LocationFields>,
}

/// Request to find vendors around a customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyVendorsRequest {
    #[serde(default)]
    pub customer_location: Option<LocationFields>,
    #[serde(default)]
    pub all_vendors: Vec<Entity>,
    /// Search radius in km, the service radius when absent
    #[serde(default, deserialize_with = "lenient_f64")]
    pub radius: Option<f64>,
}

/// Request to find delivery partners around a pickup point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyPartnersRequest {
    #[serde(default)]
    pub pickup_location: Option<LocationFields>,
    #[serde(default)]
    pub all_partners: Vec<Entity>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub radius: Option<f64>,
}

/// Request to validate a customer, vendor, delivery partner chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCoverageRequest {
    pub customer_location: Option<LocationFields>,
    pub vendor_location: Option<LocationFields>,
    pub delivery_partner_location: Option<LocationFields>,
}

/// Request for entity counts around a center point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaStatisticsRequest {
    pub center_location: Option<LocationFields>,
    #[serde(default)]
    pub all_vendors: Vec<Entity>,
    #[serde(default)]
    pub all_customers: Vec<Entity>,
    #[serde(default)]
    pub all_delivery_partners: Vec<Entity>,
}

/// Request to check whether an address is serviceable
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AreaValidationRequest {
    #[validate(length(min = 1, max = 1000))]
    pub address: String,
    #[validate(length(min = 1, max = 16))]
    pub pincode: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub city: String,
    #[serde(default)]
    pub coordinates: Option<LocationFields>,
}
