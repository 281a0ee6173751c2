use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{Platform, SearchRequest};

/// Request to start a new accommodation search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_dates"))]
pub struct StartSearchRequest {
    #[validate(length(min = 1))]
    pub location: String,
    #[serde(alias = "check_in", rename = "checkIn")]
    pub check_in: NaiveDate,
    #[serde(alias = "check_out", rename = "checkOut")]
    pub check_out: NaiveDate,
    #[validate(range(min = 1))]
    #[serde(default = "default_guests")]
    pub guests: u32,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "max_price", rename = "maxPrice")]
    pub max_price: Option<f64>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default, alias = "min_rating", rename = "minRating")]
    pub min_rating: Option<f64>,
    #[serde(default, alias = "min_reviews", rename = "minReviews")]
    pub min_reviews: Option<u32>,
    #[validate(range(min = 0.0))]
    #[serde(default, alias = "search_radius_km", rename = "searchRadiusKm")]
    pub search_radius_km: Option<f64>,
    #[validate(length(min = 1))]
    pub platforms: Vec<Platform>,
}

fn default_guests() -> u32 {
    2
}

fn validate_dates(req: &StartSearchRequest) -> Result<(), ValidationError> {
    if req.check_out <= req.check_in {
        return Err(ValidationError::new("check_out_not_after_check_in"));
    }
    Ok(())
}

impl StartSearchRequest {
    /// Freeze the request into the immutable form a job is created from.
    ///
    /// Duplicate platform entries collapse, preserving first-seen order.
    pub fn into_search_request(self) -> SearchRequest {
        let mut platforms: Vec<Platform> = Vec::with_capacity(self.platforms.len());
        for platform in self.platforms {
            if !platforms.contains(&platform) {
                platforms.push(platform);
            }
        }

        SearchRequest {
            location: self.location.trim().to_string(),
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            max_price: self.max_price,
            min_rating: self.min_rating,
            min_reviews: self.min_reviews,
            search_radius_km: self.search_radius_km,
            platforms,
        }
    }
}
