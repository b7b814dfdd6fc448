use actix_web::{web, HttpResponse, Responder};

use crate::models::HealthResponse;
use crate::routes::AppState;
use crate::services::InferenceProvider;

fn health_response<P: InferenceProvider>(state: &AppState<P>, status: &str) -> HealthResponse {
    HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service_area: state.area.name.clone(),
        inference_backend: state.provider.name().to_string(),
        timestamp: chrono::Utc::now(),
    }
}

/// GET /
pub async fn root<P: InferenceProvider + 'static>(state: web::Data<AppState<P>>) -> impl Responder {
    HttpResponse::Ok().json(health_response(state.get_ref(), "ok"))
}

/// Health check endpoint
///
/// The service has no downstream dependencies it must reach, so it reports
/// healthy whenever it can answer. A disabled inference backend still serves
/// every endpoint through fallbacks.
pub async fn health_check<P: InferenceProvider + 'static>(
    state: web::Data<AppState<P>>,
) -> impl Responder {
    HttpResponse::Ok().json(health_response(state.get_ref(), "healthy"))
}
