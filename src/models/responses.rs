use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::domain::{Job, JobStatus, Platform, PlatformProgress};

/// Response for the start-search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSearchResponse {
    #[serde(rename = "searchId")]
    pub search_id: String,
    pub status: JobStatus,
    pub message: String,
}

/// Response for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStatusResponse {
    #[serde(rename = "searchId")]
    pub search_id: String,
    pub status: JobStatus,
    pub progress: String,
    #[serde(rename = "resultsCount")]
    pub results_count: usize,
    pub platforms: BTreeMap<Platform, PlatformProgress>,
    #[serde(rename = "reportUrl", skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Job> for SearchStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            search_id: job.id,
            status: job.status,
            progress: job.progress,
            results_count: job.results.len(),
            platforms: job.platforms,
            report_url: job.report_location,
            error: job.error,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
