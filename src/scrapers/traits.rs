use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Platform, SearchRequest};
use crate::scrapers::RawListing;

/// Classified failure of a single platform scrape
///
/// Scoped to one platform; the orchestrator records it in the job's
/// sub-status and never lets it abort the job.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("timeout")]
    Timeout,

    #[error("blocked by bot protection or captcha")]
    BlockedOrCaptcha,

    #[error("failed to parse results: {0}")]
    ParseError(String),

    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ScrapeError::Timeout;
        }
        if let Some(status) = err.status() {
            if status == reqwest::StatusCode::FORBIDDEN
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            {
                return ScrapeError::BlockedOrCaptcha;
            }
        }
        ScrapeError::Unavailable(err.to_string())
    }
}

/// Common contract all platform scrapers implement
#[async_trait]
pub trait PlatformScraper: Send + Sync {
    /// The platform this scraper covers
    fn platform(&self) -> Platform;

    /// Run one search against the platform and return its raw results
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawListing>, ScrapeError>;
}
