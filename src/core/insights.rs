use std::fmt::Write;
use std::time::Duration;

use serde_json::Value;

use crate::models::{AreaCounts, Coordinate, NearbyEntity};
use crate::services::inference::{strip_code_fences, with_deadline, InferenceProvider};

/// Vendors listed in the insight prompt
pub const PROMPT_VENDOR_LIMIT: usize = 10;

/// Prompt asking for an assessment of vendor availability around a customer
pub fn vendors_prompt(customer: Coordinate, radius_km: f64, vendors: &[NearbyEntity]) -> String {
    let mut listing = String::new();
    if vendors.is_empty() {
        listing.push_str("No vendors found");
    }
    for (i, vendor) in vendors.iter().take(PROMPT_VENDOR_LIMIT).enumerate() {
        if i > 0 {
            listing.push('\n');
        }
        let _ = write!(
            listing,
            "- {} ({} km away, Rating: {}/5)",
            vendor.entity.display_name(),
            vendor.distance_km,
            vendor.entity.rating.unwrap_or(0.0)
        );
    }

    format!(
        r#"You are a location intelligence assistant for a hyperlocal commerce platform.

Customer Location: Lat {lat}, Lng {lng}
Service Radius: {radius} km
Vendors Found: {count}

Nearby Vendors:
{listing}

Assess vendor density in the area, recommend the best vendors by distance and rating,
and say whether the customer should expand the search radius.

Respond with JSON only:
{{
  "area_assessment": "good|moderate|limited",
  "recommended_vendors": ["vendor_id1", "vendor_id2"],
  "insights": "brief insights about vendor availability",
  "suggestions": ["suggestion1", "suggestion2"]
}}"#,
        lat = customer.latitude,
        lng = customer.longitude,
        radius = radius_km,
        count = vendors.len(),
        listing = listing,
    )
}

/// Prompt asking for a market assessment of an area's entity counts
pub fn area_prompt(center: Coordinate, radius_km: f64, counts: &AreaCounts) -> String {
    format!(
        r#"You are analyzing area statistics for a hyperlocal commerce platform.

Area Center: Lat {lat}, Lng {lng}
Service Radius: {radius} km

Statistics:
- Vendors in area: {vendors}
- Customers in area: {customers}
- Delivery Partners in area: {partners}

Assess market saturation, identify gaps in vendor or delivery partner supply,
and recommend actions.

Respond with JSON only:
{{
  "area_health": "excellent|good|needs_improvement",
  "vendor_density": "high|medium|low",
  "delivery_coverage": "excellent|adequate|insufficient",
  "recommendations": ["rec1", "rec2"],
  "growth_potential": "high|medium|low"
}}"#,
        lat = center.latitude,
        lng = center.longitude,
        radius = radius_km,
        vendors = counts.vendors,
        customers = counts.customers,
        partners = counts.delivery_partners,
    )
}

/// Parse a provider reply as a JSON object, tolerating markdown fences
pub fn parse_json_response(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(strip_code_fences(text)) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Ask the provider for insight JSON
///
/// Returns `None` on any failure; insights never affect the computed result.
pub async fn generate_insights<P: InferenceProvider>(
    provider: &P,
    prompt: &str,
    timeout: Duration,
) -> Option<Value> {
    match with_deadline(timeout, provider.complete(prompt)).await {
        Ok(text) => {
            let parsed = parse_json_response(&text);
            if parsed.is_none() {
                tracing::warn!("Discarding unparsable insights from {}", provider.name());
            }
            parsed
        }
        Err(e) => {
            tracing::warn!("Insights unavailable from {}: {}", provider.name(), e);
            None
        }
    }
}
