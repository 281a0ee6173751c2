use crate::models::{ListingRecord, SearchRequest};

/// Check a merged record against the request's filters.
///
/// A record is dropped only on a known violation; an unknown value for a
/// filter field never fails that filter.
#[inline]
pub fn passes_filters(record: &ListingRecord, request: &SearchRequest) -> bool {
    if let (Some(price), Some(max_price)) = (record.price_per_night, request.max_price) {
        if price > max_price {
            return false;
        }
    }

    if let (Some(rating), Some(min_rating)) = (record.rating, request.min_rating) {
        if rating < min_rating {
            return false;
        }
    }

    if let (Some(reviews), Some(min_reviews)) = (record.num_reviews, request.min_reviews) {
        if reviews < min_reviews {
            return false;
        }
    }

    if let (Some(distance), Some(radius)) = (record.distance_km, request.search_radius_km) {
        if distance > radius {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;
    use chrono::NaiveDate;

    fn request() -> SearchRequest {
        SearchRequest {
            location: "Zermatt".to_string(),
            check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
            guests: 2,
            max_price: Some(200.0),
            min_rating: Some(4.5),
            min_reviews: Some(10),
            search_radius_km: Some(5.0),
            platforms: vec![Platform::Airbnb],
        }
    }

    fn record() -> ListingRecord {
        ListingRecord {
            platform: Platform::Airbnb,
            listing_id: "1".to_string(),
            title: "Chalet".to_string(),
            price_per_night: Some(150.0),
            currency: Some("CHF".to_string()),
            rating: Some(4.8),
            num_reviews: Some(25),
            coordinate: None,
            address: None,
            image_urls: vec![],
            url: "https://www.airbnb.ch/rooms/1".to_string(),
            distance_km: Some(2.0),
            sources: vec![Platform::Airbnb],
        }
    }

    #[test]
    fn test_passing_record() {
        assert!(passes_filters(&record(), &request()));
    }

    #[test]
    fn test_known_violations_fail() {
        let mut too_expensive = record();
        too_expensive.price_per_night = Some(250.0);
        assert!(!passes_filters(&too_expensive, &request()));

        let mut low_rating = record();
        low_rating.rating = Some(4.0);
        assert!(!passes_filters(&low_rating, &request()));

        let mut few_reviews = record();
        few_reviews.num_reviews = Some(2);
        assert!(!passes_filters(&few_reviews, &request()));

        let mut too_far = record();
        too_far.distance_km = Some(12.0);
        assert!(!passes_filters(&too_far, &request()));
    }

    #[test]
    fn test_unknown_values_admitted() {
        let mut unknowns = record();
        unknowns.price_per_night = None;
        unknowns.rating = None;
        unknowns.num_reviews = None;
        unknowns.distance_km = None;
        assert!(passes_filters(&unknowns, &request()));
    }

    #[test]
    fn test_absent_min_rating_admits_everything() {
        let mut req = request();
        req.min_rating = None;
        let mut unrated = record();
        unrated.rating = None;
        assert!(passes_filters(&unrated, &req));
        let mut rated_low = record();
        rated_low.rating = Some(1.0);
        assert!(passes_filters(&rated_low, &req));
    }
}
