use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::core::GeoError;

/// Geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::InvalidInput(format!(
                "coordinate ({}, {}) is not finite",
                latitude, longitude
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidInput(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidInput(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// The (0, 0) point, used where a missing coordinate defaults rather than excludes
    pub const fn origin() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// geo uses x = longitude, y = latitude
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// Geospatial bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn to_rect(self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.min_lon, y: self.min_lat },
            geo::coord! { x: self.max_lon, y: self.max_lat },
        )
    }

    pub fn center(self) -> Coordinate {
        let center = self.to_rect().center();
        Coordinate {
            latitude: center.y,
            longitude: center.x,
        }
    }
}

/// Latitude/longitude fields as they arrive over the wire.
///
/// Both the short (`lat`/`lng`) and long (`latitude`/`longitude`) spellings are
/// accepted. Values that are not numbers (or numeric strings) read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationFields {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationFields {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Self::default()
        }
    }

    /// Short spelling first, then the long one
    pub fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.or(self.latitude)?;
        let lng = self.lng.or(self.longitude)?;
        Coordinate::new(lat, lng).ok()
    }

    /// Resolve the coordinate or fail with an error naming `field`
    pub fn require(&self, field: &str) -> Result<Coordinate, GeoError> {
        let lat = self.lat.or(self.latitude).ok_or_else(|| {
            GeoError::InvalidInput(format!("{} is missing a latitude (lat)", field))
        })?;
        let lng = self.lng.or(self.longitude).ok_or_else(|| {
            GeoError::InvalidInput(format!("{} is missing a longitude (lng)", field))
        })?;
        Coordinate::new(lat, lng)
            .map_err(|e| GeoError::InvalidInput(format!("{}: {}", field, e)))
    }
}

/// Resolve a required request location, failing fast when it is absent
pub fn require_location(
    location: Option<&LocationFields>,
    field: &str,
) -> Result<Coordinate, GeoError> {
    location
        .ok_or_else(|| GeoError::InvalidInput(format!("{} is required", field)))?
        .require(field)
}

/// Vendor, customer, or delivery partner as supplied by the caller.
///
/// Fields this service does not interpret are kept in `extra` and echoed back
/// under their original keys. Identity, load and vehicle fields arrive in more
/// than one spelling, so they stay raw and are read through accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_location", skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFields>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const ID_KEYS: [&str; 2] = ["id", "_id"];
const LOAD_KEYS: [&str; 2] = ["active_orders", "activeOrders"];
const VEHICLE_KEYS: [&str; 2] = ["vehicle_type", "vehicleType"];

impl Entity {
    /// Attach a pass-through field
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// First usable of `id`, `_id`
    pub fn id(&self) -> Option<String> {
        ID_KEYS.iter().find_map(|key| match self.extra.get(*key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Active orders from `active_orders` or `activeOrders`, defaulting to zero
    pub fn load(&self) -> u32 {
        LOAD_KEYS
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(u32_from_value))
            .unwrap_or(0)
    }

    pub fn vehicle_type(&self) -> Option<&str> {
        VEHICLE_KEYS
            .iter()
            .find_map(|key| self.extra.get(*key)?.as_str())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// Entity that passed the radius filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyEntity {
    #[serde(flatten)]
    pub entity: Entity,
    pub distance_km: f64,
    pub within_service_area: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_pickup_time_mins: Option<u32>,
}

/// How the configured area is tested for geolocation scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geofence {
    /// Inside the box scores full marks, outside decays by degree-distance from its center
    BoundingBox(BoundingBox),
    /// Degree-distance from a center point
    CenterRadius(Coordinate),
    /// No geometry configured; coordinates score neutral
    Unbounded,
}

/// The serviceable area, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct ServiceArea {
    pub name: String,
    pub city: Option<String>,
    pub pincodes: BTreeSet<String>,
    pub landmarks: Vec<String>,
    pub boundary_description: String,
    pub geofence: Geofence,
    pub service_radius_km: f64,
    /// Largest search radius a caller may request
    pub max_radius_km: f64,
}

/// Cap on per-request search radii unless configured otherwise
pub const DEFAULT_MAX_RADIUS_KM: f64 = 10.0;

impl ServiceArea {
    /// A bounding box wins over a center when both are configured
    pub fn new(
        name: impl Into<String>,
        pincodes: impl IntoIterator<Item = String>,
        landmarks: Vec<String>,
        bounding_box: Option<BoundingBox>,
        center: Option<Coordinate>,
        service_radius_km: f64,
    ) -> Result<Self, GeoError> {
        if !service_radius_km.is_finite() || service_radius_km <= 0.0 {
            return Err(GeoError::InvalidConfig(format!(
                "service_radius_km must be positive, got {}",
                service_radius_km
            )));
        }

        if let Some(bbox) = bounding_box {
            if bbox.min_lat > bbox.max_lat || bbox.min_lon > bbox.max_lon {
                return Err(GeoError::InvalidConfig(format!(
                    "bounding box minimums exceed maximums: {:?}",
                    bbox
                )));
            }
        }

        let geofence = match (bounding_box, center) {
            (Some(bbox), _) => Geofence::BoundingBox(bbox),
            (None, Some(center)) => Geofence::CenterRadius(center),
            (None, None) => Geofence::Unbounded,
        };

        let name = name.into();
        Ok(Self {
            boundary_description: format!("{} service area", name),
            name,
            city: None,
            pincodes: pincodes
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            landmarks,
            geofence,
            service_radius_km,
            max_radius_km: DEFAULT_MAX_RADIUS_KM.max(service_radius_km),
        })
    }

    pub fn with_city(mut self, city: Option<String>) -> Self {
        self.city = city;
        self
    }

    pub fn with_boundary_description(mut self, description: Option<String>) -> Self {
        if let Some(description) = description {
            self.boundary_description = description;
        }
        self
    }

    /// Override the per-request radius cap
    ///
    /// # Errors
    /// The cap must be finite and no smaller than the service radius.
    pub fn with_max_radius_km(mut self, max_radius_km: Option<f64>) -> Result<Self, GeoError> {
        if let Some(max_radius_km) = max_radius_km {
            if !max_radius_km.is_finite() || max_radius_km < self.service_radius_km {
                return Err(GeoError::InvalidConfig(format!(
                    "max_radius_km must be at least service_radius_km ({}), got {}",
                    self.service_radius_km, max_radius_km
                )));
            }
            self.max_radius_km = max_radius_km;
        }
        Ok(self)
    }
}

/// Per-signal scores feeding the confidence blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pincode: f64,
    pub address: f64,
    pub geolocation: f64,
}

/// Blend weights for the confidence score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub pincode: f64,
    pub address: f64,
    pub geolocation: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            pincode: 0.4,
            address: 0.3,
            geolocation: 0.3,
        }
    }
}

/// Which confidence thresholds decide the status. Chosen once per process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionBands {
    /// approved >= 0.75, uncertain >= 0.40, else rejected
    #[default]
    Standard,
    /// approved >= 0.8, pending >= 0.5, else rejected
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    Approved,
    Uncertain,
    Pending,
    Rejected,
}

/// Outcome of an area validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub confidence: f64,
    pub message: String,
    pub area_name: String,
    pub reasoning: String,
    pub scores: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainDistances {
    pub customer_to_vendor_km: f64,
    pub vendor_to_delivery_partner_km: f64,
    pub delivery_partner_to_customer_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainCoverage {
    pub customer_vendor: bool,
    pub vendor_delivery: bool,
    pub delivery_customer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedTimes {
    pub pickup_time_mins: u32,
    pub delivery_time_mins: u32,
    pub total_time_mins: u32,
}

/// Coverage of a customer, vendor, delivery partner chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub service_coverage_valid: bool,
    pub distances: ChainDistances,
    pub within_service_area: ChainCoverage,
    pub estimated_times: EstimatedTimes,
    pub service_radius_km: f64,
}

/// Number of entities of each kind inside the radius
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCounts {
    pub vendors: usize,
    pub customers: usize,
    pub delivery_partners: usize,
}

fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn u32_from_value(value: &Value) -> Option<u32> {
    number_from_value(value)
        .filter(|n| *n >= 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_location<'de, D>(deserializer: D) -> Result<Option<LocationFields>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}
