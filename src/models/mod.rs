// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AggregatedResult, DedupTolerances, GeoPoint, Job, JobStatus, ListingRecord, Platform,
    PlatformCounts, PlatformProgress, PlatformStatus, RankingWeights, SearchRequest,
};
pub use requests::StartSearchRequest;
pub use responses::{ErrorResponse, HealthResponse, SearchStatusResponse, StartSearchResponse};
