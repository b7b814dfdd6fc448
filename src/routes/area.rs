use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{AreaValidationRequest, ErrorResponse, LocationFields};
use crate::routes::AppState;
use crate::services::InferenceProvider;

/// Configure the area validation route
pub fn configure<P: InferenceProvider + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/area-validation", web::post().to(validate_area::<P>));
}

/// Area validation endpoint
///
/// POST /agents/area-validation
///
/// Request body:
/// ```json
/// {
///   "address": "12 Shivalik Residency, near Gota Circle",
///   "pincode": "382481",
///   "city": "Ahmedabad",
///   "coordinates": {"lat": 23.1167, "lng": 72.5667}
/// }
/// ```
async fn validate_area<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
    req: web::Json<AreaValidationRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for area-validation request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Out-of-range or partial coordinates score as if none were sent
    let coordinates = req.coordinates.as_ref().and_then(LocationFields::coordinate);
    if req.coordinates.is_some() && coordinates.is_none() {
        tracing::debug!("Ignoring unusable coordinates for pincode {}", req.pincode);
    }

    let result = state
        .scorer
        .validate(&req.address, &req.pincode, &req.city, coordinates)
        .await;

    HttpResponse::Ok().json(result)
}
