use actix_web::{web, HttpResponse, Responder};

use crate::core::{haversine_distance, insights, GeoError};
use crate::models::{
    require_location, AreaStatisticsRequest, AreaStatisticsResponse, CalculateDistanceRequest,
    Coordinate, DistanceResponse, ErrorResponse, NearbyErrorResponse, NearbyPartnersRequest,
    NearbyPartnersResponse, NearbyVendorsRequest, NearbyVendorsResponse, ValidateCoverageRequest,
};
use crate::routes::{internal_error, AppState};
use crate::services::InferenceProvider;

/// Configure all location routes
pub fn configure<P: InferenceProvider + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/location")
            .route("/calculate-distance", web::post().to(calculate_distance::<P>))
            .route("/nearby-vendors", web::post().to(nearby_vendors::<P>))
            .route(
                "/nearby-delivery-partners",
                web::post().to(nearby_delivery_partners::<P>),
            )
            .route("/validate-coverage", web::post().to(validate_coverage::<P>))
            .route("/area-statistics", web::post().to(area_statistics::<P>)),
    );
}

/// Distance between two points
///
/// POST /agents/location/calculate-distance
///
/// Request body:
/// ```json
/// {
///   "location1": {"lat": 23.1167, "lng": 72.5667},
///   "location2": {"latitude": 23.0225, "longitude": 72.5714}
/// }
/// ```
async fn calculate_distance<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<CalculateDistanceRequest>,
) -> impl Responder {
    let points = require_location(req.location1.as_ref(), "location1").and_then(|from| {
        require_location(req.location2.as_ref(), "location2").map(|to| (from, to))
    });

    let (from, to) = match points {
        Ok(points) => points,
        Err(e) => return internal_error("Failed to calculate distance", &e),
    };

    let distance_km = haversine_distance(from, to);
    let service_radius_km = state.matcher.radius_km();

    HttpResponse::Ok().json(DistanceResponse {
        distance_km,
        within_service_area: distance_km <= service_radius_km,
        service_radius_km,
    })
}

/// Vendors within the service radius of a customer, closest first
///
/// POST /agents/location/nearby-vendors
async fn nearby_vendors<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<NearbyVendorsRequest>,
) -> impl Responder {
    let NearbyVendorsRequest {
        customer_location,
        all_vendors,
        radius,
    } = req.into_inner();
    let radius_km = match state.matcher.resolve_radius(radius) {
        Ok(radius_km) => radius_km,
        Err(e) => return bad_radius(&e),
    };
    let customer_location = customer_location.unwrap_or_default();
    let total_candidates = all_vendors.len();

    let vendors = match state
        .matcher
        .nearby_vendors_within(&customer_location, all_vendors, radius_km)
    {
        Ok(vendors) => vendors,
        Err(e) => {
            tracing::info!("Rejecting nearby-vendors request: {}", e);
            return HttpResponse::Ok().json(NearbyErrorResponse {
                error: "Invalid customer location".to_string(),
                message: e.to_string(),
                nearby_vendors: Some(Vec::new()),
                nearby_partners: None,
            });
        }
    };

    let ai_insights = match customer_location.coordinate() {
        Some(customer) if state.insights_enabled => {
            let prompt = insights::vendors_prompt(customer, radius_km, &vendors);
            insights::generate_insights(&*state.provider, &prompt, state.inference_timeout)
                .await
        }
        _ => None,
    };

    tracing::info!(
        "Returning {} nearby vendors (from {} candidates)",
        vendors.len(),
        total_candidates
    );

    HttpResponse::Ok().json(NearbyVendorsResponse {
        customer_location,
        service_radius_km: radius_km,
        total_vendors_found: vendors.len(),
        nearby_vendors: vendors,
        ai_insights,
    })
}

/// Delivery partners near a pickup point, least loaded first
///
/// POST /agents/location/nearby-delivery-partners
async fn nearby_delivery_partners<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<NearbyPartnersRequest>,
) -> impl Responder {
    let NearbyPartnersRequest {
        pickup_location,
        all_partners,
        radius,
    } = req.into_inner();
    let radius_km = match state.matcher.resolve_radius(radius) {
        Ok(radius_km) => radius_km,
        Err(e) => return bad_radius(&e),
    };
    let pickup_location = pickup_location.unwrap_or_default();

    let matched = match state
        .matcher
        .nearby_delivery_partners_within(&pickup_location, all_partners, radius_km)
    {
        Ok(matched) => matched,
        Err(e) => {
            tracing::info!("Rejecting nearby-delivery-partners request: {}", e);
            return HttpResponse::Ok().json(NearbyErrorResponse {
                error: "Invalid pickup location".to_string(),
                message: e.to_string(),
                nearby_vendors: None,
                nearby_partners: Some(Vec::new()),
            });
        }
    };

    if let Some(pick) = &matched.recommendation {
        tracing::debug!(
            "Recommending partner {} ({} km, {} active orders)",
            pick.entity.display_name(),
            pick.distance_km,
            pick.entity.load()
        );
    }

    HttpResponse::Ok().json(NearbyPartnersResponse {
        pickup_location,
        service_radius_km: radius_km,
        total_partners_found: matched.partners.len(),
        nearby_partners: matched.partners,
        recommendation: matched.recommendation,
    })
}

fn bad_radius(err: &GeoError) -> HttpResponse {
    tracing::info!("Rejecting search radius: {}", err);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Invalid radius".to_string(),
        message: err.to_string(),
        status_code: 400,
    })
}

/// Coverage check for a customer, vendor and delivery partner
///
/// POST /agents/location/validate-coverage
async fn validate_coverage<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<ValidateCoverageRequest>,
) -> impl Responder {
    match coverage_chain(&req) {
        Ok((customer, vendor, partner)) => {
            HttpResponse::Ok().json(state.coverage.validate_coverage(customer, vendor, partner))
        }
        Err(e) => internal_error("Failed to validate coverage", &e),
    }
}

fn coverage_chain(
    req: &ValidateCoverageRequest,
) -> Result<(Coordinate, Coordinate, Coordinate), GeoError> {
    Ok((
        require_location(req.customer_location.as_ref(), "customer_location")?,
        require_location(req.vendor_location.as_ref(), "vendor_location")?,
        require_location(
            req.delivery_partner_location.as_ref(),
            "delivery_partner_location",
        )?,
    ))
}

/// Entity counts around a center point
///
/// POST /agents/location/area-statistics
async fn area_statistics<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<AreaStatisticsRequest>,
) -> impl Responder {
    let center = match require_location(req.center_location.as_ref(), "center_location") {
        Ok(center) => center,
        Err(e) => return internal_error("Failed to compute area statistics", &e),
    };

    let statistics = state.stats.area_stats(
        center,
        &req.all_vendors,
        &req.all_customers,
        &req.all_delivery_partners,
    );

    let ai_insights = if state.insights_enabled {
        let prompt = insights::area_prompt(center, state.stats.radius_km(), &statistics);
        insights::generate_insights(&*state.provider, &prompt, state.inference_timeout)
            .await
    } else {
        None
    };

    HttpResponse::Ok().json(AreaStatisticsResponse {
        area_center: req.into_inner().center_location.unwrap_or_default(),
        service_radius_km: state.stats.radius_km(),
        statistics,
        ai_insights,
    })
}
