use crate::core::distance::{eta_minutes, haversine_distance};
use crate::models::{ChainCoverage, ChainDistances, Coordinate, CoverageResult, EstimatedTimes};

/// Fixed handover allowance added to every delivery estimate
pub const HANDLING_BUFFER_MINS: u32 = 5;

/// Checks that a customer, vendor and delivery partner are mutually in range
#[derive(Debug, Clone)]
pub struct CoverageValidator {
    radius_km: f64,
}

impl CoverageValidator {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Validate the whole order chain and estimate pickup and delivery times
    pub fn validate_coverage(
        &self,
        customer: Coordinate,
        vendor: Coordinate,
        partner: Coordinate,
    ) -> CoverageResult {
        let distances = ChainDistances {
            customer_to_vendor_km: haversine_distance(customer, vendor),
            vendor_to_delivery_partner_km: haversine_distance(vendor, partner),
            delivery_partner_to_customer_km: haversine_distance(partner, customer),
        };

        let result = self.evaluate(distances);

        tracing::debug!(
            "Coverage {} (c-v {} km, v-p {} km, p-c {} km), ETA {} min",
            if result.service_coverage_valid { "valid" } else { "invalid" },
            distances.customer_to_vendor_km,
            distances.vendor_to_delivery_partner_km,
            distances.delivery_partner_to_customer_km,
            result.estimated_times.total_time_mins
        );

        result
    }

    /// Apply the radius checks and ETA model to precomputed leg distances
    pub fn evaluate(&self, distances: ChainDistances) -> CoverageResult {
        let within_service_area = ChainCoverage {
            customer_vendor: distances.customer_to_vendor_km <= self.radius_km,
            vendor_delivery: distances.vendor_to_delivery_partner_km <= self.radius_km,
            delivery_customer: distances.delivery_partner_to_customer_km <= self.radius_km,
        };

        let pickup_time_mins = eta_minutes(distances.vendor_to_delivery_partner_km);
        let delivery_time_mins = eta_minutes(distances.delivery_partner_to_customer_km);

        CoverageResult {
            service_coverage_valid: within_service_area.customer_vendor
                && within_service_area.vendor_delivery
                && within_service_area.delivery_customer,
            distances,
            within_service_area,
            estimated_times: EstimatedTimes {
                pickup_time_mins,
                delivery_time_mins,
                total_time_mins: pickup_time_mins + delivery_time_mins + HANDLING_BUFFER_MINS,
            },
            service_radius_km: self.radius_km,
        }
    }
}
