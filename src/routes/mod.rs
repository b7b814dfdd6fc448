// Route exports
pub mod area;
pub mod health;
pub mod location;

use std::sync::Arc;
use std::time::Duration;

use actix_web::{error, http::StatusCode, web, HttpResponse};

use crate::core::{AreaStatistics, ConfidenceScorer, CoverageValidator, GeoError, Matcher};
use crate::models::{DecisionBands, ErrorResponse, ServiceArea};
use crate::services::InferenceProvider;

/// Application state shared across all handlers
pub struct AppState<P> {
    pub area: Arc<ServiceArea>,
    pub provider: Arc<P>,
    pub matcher: Matcher,
    pub coverage: CoverageValidator,
    pub stats: AreaStatistics,
    pub scorer: ConfidenceScorer<P>,
    pub inference_timeout: Duration,
    pub insights_enabled: bool,
}

impl<P: InferenceProvider> AppState<P> {
    pub fn new(
        area: ServiceArea,
        provider: P,
        bands: DecisionBands,
        inference_timeout: Duration,
        insights_enabled: bool,
    ) -> Self {
        let radius_km = area.service_radius_km;
        let area = Arc::new(area);
        let provider = Arc::new(provider);

        Self {
            scorer: ConfidenceScorer::new(area.clone(), provider.clone(), bands, inference_timeout),
            matcher: Matcher::new(radius_km).with_max_radius(area.max_radius_km),
            coverage: CoverageValidator::new(radius_km),
            stats: AreaStatistics::new(radius_km),
            area,
            provider,
            inference_timeout,
            insights_enabled,
        }
    }
}

/// Mount every endpoint
pub fn configure_routes<P: InferenceProvider + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health::root::<P>))
        .route("/health", web::get().to(health::health_check::<P>))
        .service(
            web::scope("/agents")
                .configure(location::configure::<P>)
                .configure(area::configure::<P>),
        );
}

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Map a core error to a 500 response
pub(crate) fn internal_error(context: &str, err: &GeoError) -> HttpResponse {
    tracing::warn!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: context.to_string(),
        message: err.to_string(),
        status_code: 500,
    })
}
