use crate::core::{
    distance::is_within_radius,
    resolver::{resolve_latitude, resolve_longitude},
};
use crate::models::{AreaCounts, Coordinate, Entity};

/// Counts vendors, customers and delivery partners around a point
#[derive(Debug, Clone)]
pub struct AreaStatistics {
    radius_km: f64,
}

impl AreaStatistics {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Count each kind of entity within the radius of `center`
    ///
    /// Each missing axis defaults to 0 on its own, so an entity with no
    /// coordinate sits at (0, 0) and one with only a latitude sits on the
    /// prime meridian. Callers that need exact exclusion should filter those
    /// entities before calling.
    pub fn area_stats(
        &self,
        center: Coordinate,
        vendors: &[Entity],
        customers: &[Entity],
        partners: &[Entity],
    ) -> AreaCounts {
        AreaCounts {
            vendors: self.count_within(center, vendors),
            customers: self.count_within(center, customers),
            delivery_partners: self.count_within(center, partners),
        }
    }

    pub fn count_within(&self, center: Coordinate, entities: &[Entity]) -> usize {
        entities
            .iter()
            .filter_map(|e| {
                let latitude = resolve_latitude(e).unwrap_or(0.0);
                let longitude = resolve_longitude(e).unwrap_or(0.0);
                Coordinate::new(latitude, longitude).ok()
            })
            .filter(|coord| is_within_radius(center, *coord, self.radius_km))
            .count()
    }
}
