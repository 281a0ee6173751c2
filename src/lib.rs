//! Stay Scout - Multi-platform accommodation search service
//!
//! This library provides the search-job orchestration and result-aggregation
//! engine behind the Stay Scout API. It fans a search request out to several
//! travel-site scrapers concurrently, tracks per-job and per-platform
//! progress, and merges the partial results into one deduplicated, filtered,
//! ranked report.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod scrapers;
pub mod services;

// Re-export commonly used types
pub use core::{geo::haversine_km, Aggregator};
pub use models::{
    AggregatedResult, Job, JobStatus, ListingRecord, Platform, PlatformStatus, SearchRequest,
    StartSearchRequest,
};
pub use services::{JobRegistry, Orchestrator, SearchTimeouts};
