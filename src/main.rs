mod config;
mod core;
mod models;
mod routes;
mod scrapers;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::Aggregator;
use models::{DedupTolerances, RankingWeights};
use routes::search::AppState;
use services::{FileReportSink, GoogleMapsClient, JobRegistry, Orchestrator, SearchTimeouts};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

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
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_request".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Stay Scout search service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Job registry with its eviction sweeper
    let registry = Arc::new(JobRegistry::new(Duration::from_secs(
        settings.registry.retention_secs,
    )));

    let sweeper_registry = registry.clone();
    let sweep_interval = Duration::from_secs(settings.registry.sweep_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            let evicted = sweeper_registry.sweep().await;
            if evicted > 0 {
                info!("Evicted {} expired search job(s)", evicted);
            }
        }
    });

    // Platform scrapers share one HTTP client
    let platform_scrapers = scrapers::build_scrapers(&settings.scraping).unwrap_or_else(|e| {
        error!("Failed to create HTTP client: {}", e);
        panic!("HTTP client error: {}", e);
    });

    info!("Scrapers initialized for {} platforms", platform_scrapers.len());

    // Distance lookups degrade to "unknown" without an API key
    let maps = Arc::new(GoogleMapsClient::new(settings.maps.api_key.clone()));
    if settings.maps.api_key.is_none() {
        info!("No Google Maps API key configured, distances will stay unknown");
    }

    let report_dir = PathBuf::from(&settings.report.output_dir);
    let sink = Arc::new(FileReportSink::new(report_dir.clone()));

    let aggregator = Aggregator::new(
        RankingWeights {
            rating: settings.ranking.weights.rating,
            reviews: settings.ranking.weights.reviews,
            price: settings.ranking.weights.price,
        },
        DedupTolerances {
            geo_tolerance_km: settings.dedup.geo_tolerance_km,
            price_tolerance: settings.dedup.price_tolerance,
        },
    );

    let orchestrator = Arc::new(Orchestrator::new(
        registry.clone(),
        platform_scrapers,
        maps,
        sink,
        aggregator,
        SearchTimeouts {
            job: Duration::from_secs(settings.search.job_timeout_secs),
            platform: Duration::from_secs(settings.search.platform_timeout_secs),
        },
    ));

    info!(
        "Orchestrator initialized (job timeout: {}s, platform timeout: {}s)",
        settings.search.job_timeout_secs, settings.search.platform_timeout_secs
    );

    // Build application state
    let app_state = AppState {
        registry,
        orchestrator,
        report_dir,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
