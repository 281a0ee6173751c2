use actix_web::{web, HttpResponse, Responder};
use std::path::PathBuf;
use std::sync::Arc;
use validator::Validate;

use crate::models::{
    ErrorResponse, HealthResponse, JobStatus, SearchStatusResponse, StartSearchRequest,
    StartSearchResponse,
};
use crate::services::{JobRegistry, Orchestrator, RegistryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<JobRegistry>,
    pub orchestrator: Arc<Orchestrator>,
    pub report_dir: PathBuf,
}

/// Configure all search-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/search", web::post().to(start_search))
        .route("/search/{search_id}", web::get().to(search_status))
        .route("/results/{filename}", web::get().to(results_file));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Start a new accommodation search
///
/// POST /api/v1/search
///
/// Request body:
/// ```json
/// {
///   "location": "Zermatt",
///   "checkIn": "2026-01-10",
///   "checkOut": "2026-01-17",
///   "guests": 2,
///   "maxPrice": 300,
///   "platforms": ["airbnb", "booking"]
/// }
/// ```
async fn start_search(
    state: web::Data<AppState>,
    req: web::Json<StartSearchRequest>,
) -> impl Responder {
    // Reject invalid requests synchronously, before any job exists
    if let Err(errors) = req.validate() {
        tracing::info!("Rejected search request: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_request".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let request = req.into_inner().into_search_request();
    let search_id = state.registry.create(request).await;

    tracing::info!("Accepted search {}", search_id);

    // Run the job in the background; the client polls by id
    let orchestrator = state.orchestrator.clone();
    let job_id = search_id.clone();
    tokio::spawn(async move {
        orchestrator.run(&job_id).await;
    });

    HttpResponse::Ok().json(StartSearchResponse {
        message: format!(
            "Search started! Poll /api/v1/search/{} for status.",
            search_id
        ),
        search_id,
        status: JobStatus::Queued,
    })
}

/// Get the status of a search
///
/// GET /api/v1/search/{search_id}
async fn search_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let search_id = path.into_inner();

    match state.registry.get(&search_id).await {
        Ok(job) => HttpResponse::Ok().json(SearchStatusResponse::from(job)),
        Err(RegistryError::NotFound(_)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("Search id {} not found", search_id),
            status_code: 404,
        }),
    }
}

/// Serve a stored report file (HTML inline, CSV as download)
///
/// GET /api/v1/results/{filename}
async fn results_file(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let filename = path.into_inner();

    // The report directory is flat; anything path-like is an escape attempt
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return HttpResponse::Forbidden().json(ErrorResponse {
            error: "forbidden".to_string(),
            message: "Invalid file name".to_string(),
            status_code: 403,
        });
    }

    let file_path = state.report_dir.join(&filename);
    match tokio::fs::read(&file_path).await {
        Ok(bytes) => {
            if filename.ends_with(".html") {
                HttpResponse::Ok()
                    .content_type("text/html; charset=utf-8")
                    .insert_header(("Content-Disposition", "inline"))
                    .body(bytes)
            } else {
                HttpResponse::Ok()
                    .content_type("text/csv; charset=utf-8")
                    .insert_header((
                        "Content-Disposition",
                        format!("attachment; filename=\"{}\"", filename),
                    ))
                    .body(bytes)
            }
        }
        Err(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("File {} not found", filename),
            status_code: 404,
        }),
    }
}
