use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported booking platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Airbnb,
    Booking,
    HotelsCom,
    Expedia,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Airbnb => "airbnb",
            Platform::Booking => "booking",
            Platform::HotelsCom => "hotelscom",
            Platform::Expedia => "expedia",
        }
    }

    /// Display name used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Airbnb => "Airbnb",
            Platform::Booking => "Booking.com",
            Platform::HotelsCom => "Hotels.com",
            Platform::Expedia => "Expedia",
        }
    }

    /// Maximum value of the platform's native rating scale.
    ///
    /// Airbnb rates 0-5, the hotel platforms rate 0-10; the normalizer
    /// converts everything to the canonical 0-5 scale.
    pub fn rating_scale(&self) -> f64 {
        match self {
            Platform::Airbnb => 5.0,
            _ => 10.0,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable search parameters a job is created from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub location: String,
    #[serde(rename = "checkIn")]
    pub check_in: NaiveDate,
    #[serde(rename = "checkOut")]
    pub check_out: NaiveDate,
    pub guests: u32,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
    #[serde(rename = "minRating")]
    pub min_rating: Option<f64>,
    #[serde(rename = "minReviews")]
    pub min_reviews: Option<u32>,
    #[serde(rename = "searchRadiusKm")]
    pub search_radius_km: Option<f64>,
    pub platforms: Vec<Platform>,
}

/// WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Canonical listing shape shared across platforms
///
/// Numeric fields are `None` when the source did not expose them; they are
/// never coerced to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub platform: Platform,
    #[serde(rename = "listingId")]
    pub listing_id: String,
    pub title: String,
    #[serde(rename = "pricePerNight")]
    pub price_per_night: Option<f64>,
    pub currency: Option<String>,
    /// Canonical 0-5 scale
    pub rating: Option<f64>,
    #[serde(rename = "numReviews")]
    pub num_reviews: Option<u32>,
    pub coordinate: Option<GeoPoint>,
    pub address: Option<String>,
    #[serde(rename = "imageUrls", default)]
    pub image_urls: Vec<String>,
    pub url: String,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    /// Platforms this listing was seen on; grows when duplicates merge
    #[serde(default)]
    pub sources: Vec<Platform>,
}

/// Job lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::TimedOut
        )
    }
}

/// Per-platform sub-states within a running job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl PlatformStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlatformStatus::Succeeded | PlatformStatus::Failed)
    }
}

/// Progress of one platform within a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformProgress {
    pub status: PlatformStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub listings: usize,
}

impl PlatformProgress {
    pub fn pending() -> Self {
        Self {
            status: PlatformStatus::Pending,
            reason: None,
            listings: 0,
        }
    }
}

/// A search job tracked by the registry
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub request: SearchRequest,
    pub status: JobStatus,
    pub platforms: BTreeMap<Platform, PlatformProgress>,
    pub progress: String,
    pub results: Vec<ListingRecord>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub report_location: Option<String>,
    pub error: Option<String>,
}

/// Per-platform counters reported alongside the aggregated list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlatformCounts {
    pub requested: bool,
    pub succeeded: bool,
    /// Records the platform returned before deduplication
    pub returned: usize,
    /// Merged records surviving the filters that carry this platform as a source
    #[serde(rename = "afterFilter")]
    pub after_filter: usize,
}

/// Final output of the aggregation pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub listings: Vec<ListingRecord>,
    #[serde(rename = "platformCounts")]
    pub platform_counts: BTreeMap<Platform, PlatformCounts>,
}

/// Ranking weights
#[derive(Debug, Clone, Copy)]
pub struct RankingWeights {
    pub rating: f64,
    pub reviews: f64,
    pub price: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            rating: 0.5,
            reviews: 0.3,
            price: 0.2,
        }
    }
}

/// Tolerances for cross-platform duplicate detection
#[derive(Debug, Clone, Copy)]
pub struct DedupTolerances {
    /// Coordinates closer than this count as the same location
    pub geo_tolerance_km: f64,
    /// Maximum relative nightly-price difference for a merge
    pub price_tolerance: f64,
}

impl Default for DedupTolerances {
    fn default() -> Self {
        Self {
            geo_tolerance_km: 0.5,
            price_tolerance: 0.05,
        }
    }
}
