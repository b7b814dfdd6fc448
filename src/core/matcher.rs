use std::cmp::Ordering;

use crate::core::{
    distance::{eta_minutes, haversine_distance},
    resolver::resolve_coordinate,
    GeoError,
};
use crate::models::{domain::DEFAULT_MAX_RADIUS_KM, Entity, LocationFields, NearbyEntity};

/// Ordering applied to entities that passed the radius filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingPolicy {
    /// Closest first
    Vendor,
    /// Fewest active orders first, then closest
    DeliveryPartner,
}

/// Delivery partners in range plus the one to assign
#[derive(Debug)]
pub struct PartnerMatch {
    pub partners: Vec<NearbyEntity>,
    pub recommendation: Option<NearbyEntity>,
}

/// Radius matcher for vendors and delivery partners
///
/// # Pipeline Stages
/// 1. Coordinate resolution (unlocatable candidates are skipped)
/// 2. Haversine radius filter
/// 3. Ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    radius_km: f64,
    max_radius_km: f64,
}

impl Matcher {
    pub fn new(radius_km: f64) -> Self {
        Self {
            radius_km,
            max_radius_km: DEFAULT_MAX_RADIUS_KM.max(radius_km),
        }
    }

    pub fn with_max_radius(mut self, max_radius_km: f64) -> Self {
        self.max_radius_km = max_radius_km.max(self.radius_km);
        self
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn max_radius_km(&self) -> f64 {
        self.max_radius_km
    }

    /// Search radius for a request that may carry its own `radius`
    ///
    /// Missing, NaN and non-positive values fall back to the service radius.
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidInput`] when the request asks for more than
    /// the configured cap.
    pub fn resolve_radius(&self, requested: Option<f64>) -> Result<f64, GeoError> {
        match requested {
            Some(radius) if radius > self.max_radius_km => Err(GeoError::InvalidInput(format!(
                "Radius cannot exceed {} km",
                self.max_radius_km
            ))),
            Some(radius) if radius.is_finite() && radius > 0.0 => Ok(radius),
            _ => Ok(self.radius_km),
        }
    }

    /// Find candidates within `radius_km` of `center`
    ///
    /// # Errors
    /// Returns [`GeoError::InvalidInput`] when `center` has no usable
    /// coordinate, so an empty result always means "nothing in range".
    pub fn nearby_entities(
        &self,
        center: &LocationFields,
        candidates: Vec<Entity>,
        radius_km: f64,
        ranking: RankingPolicy,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        let center = center.require("center location")?;
        let total_candidates = candidates.len();

        let mut nearby: Vec<NearbyEntity> = candidates
            .into_iter()
            // Stage 1: resolve
            .filter_map(|entity| resolve_coordinate(&entity).map(|coord| (entity, coord)))
            // Stage 2: radius filter
            .filter_map(|(entity, coord)| {
                let distance_km = haversine_distance(center, coord);
                (distance_km <= radius_km).then(|| NearbyEntity {
                    estimated_pickup_time_mins: match ranking {
                        RankingPolicy::DeliveryPartner => Some(eta_minutes(distance_km)),
                        RankingPolicy::Vendor => None,
                    },
                    entity,
                    distance_km,
                    within_service_area: true,
                })
            })
            .collect();

        // Stage 3: stable sort keeps input order on ties
        match ranking {
            RankingPolicy::Vendor => nearby.sort_by(|a, b| by_distance(a, b)),
            RankingPolicy::DeliveryPartner => nearby.sort_by(|a, b| {
                a.entity
                    .load()
                    .cmp(&b.entity.load())
                    .then_with(|| by_distance(a, b))
            }),
        }

        tracing::debug!(
            "{} of {} candidates within {} km ({:?} ranking)",
            nearby.len(),
            total_candidates,
            radius_km,
            ranking
        );

        Ok(nearby)
    }

    /// Vendors within the service radius of a customer, closest first
    pub fn nearby_vendors(
        &self,
        customer: &LocationFields,
        vendors: Vec<Entity>,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        self.nearby_vendors_within(customer, vendors, self.radius_km)
    }

    pub fn nearby_vendors_within(
        &self,
        customer: &LocationFields,
        vendors: Vec<Entity>,
        radius_km: f64,
    ) -> Result<Vec<NearbyEntity>, GeoError> {
        self.nearby_entities(customer, vendors, radius_km, RankingPolicy::Vendor)
    }

    /// Delivery partners within the service radius of a pickup point,
    /// least loaded first
    pub fn nearby_delivery_partners(
        &self,
        pickup: &LocationFields,
        partners: Vec<Entity>,
    ) -> Result<PartnerMatch, GeoError> {
        self.nearby_delivery_partners_within(pickup, partners, self.radius_km)
    }

    pub fn nearby_delivery_partners_within(
        &self,
        pickup: &LocationFields,
        partners: Vec<Entity>,
        radius_km: f64,
    ) -> Result<PartnerMatch, GeoError> {
        let partners =
            self.nearby_entities(pickup, partners, radius_km, RankingPolicy::DeliveryPartner)?;
        let recommendation = partners.first().cloned();

        Ok(PartnerMatch {
            partners,
            recommendation,
        })
    }
}

fn by_distance(a: &NearbyEntity, b: &NearbyEntity) -> Ordering {
    a.distance_km
        .partial_cmp(&b.distance_km)
        .unwrap_or(Ordering::Equal)
}
