use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use localloop_geo::config::{LoggingSettings, Settings};
use localloop_geo::routes::{self, handle_json_payload_error, AppState};
use localloop_geo::services::{build_provider, InferenceBackend};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn config_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging is not up yet, so configuration errors go to stderr
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&settings.logging);

    info!("Starting Local Loop geospatial service...");

    let area = settings
        .service_area
        .build()
        .map_err(|e| config_error("Invalid service area", e))?;

    info!(
        "Service area '{}' loaded ({} pincodes, {} landmarks, {} km radius, {:?})",
        area.name,
        area.pincodes.len(),
        area.landmarks.len(),
        area.service_radius_km,
        area.geofence
    );

    let provider: InferenceBackend = build_provider(&settings.inference)
        .map_err(|e| config_error("Invalid inference configuration", e))?;

    let app_state = web::Data::new(AppState::new(
        area,
        provider,
        settings.scoring.bands,
        Duration::from_secs(settings.inference.timeout_secs),
        settings.inference.insights,
    ));

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{} ({} workers)", host, port, workers);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<InferenceBackend>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
