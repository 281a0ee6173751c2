// Unit tests for Stay Scout

use chrono::NaiveDate;
use stay_scout::core::{dedup::dedupe, filters::passes_filters, normalize, Aggregator};
use stay_scout::models::{
    DedupTolerances, GeoPoint, ListingRecord, Platform, SearchRequest,
};
use stay_scout::scrapers::RawListing;
use validator::Validate;

fn search_request(platforms: Vec<Platform>) -> SearchRequest {
    SearchRequest {
        location: "Zermatt".to_string(),
        check_in: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        check_out: NaiveDate::from_ymd_opt(2026, 1, 17).unwrap(),
        guests: 2,
        max_price: None,
        min_rating: None,
        min_reviews: None,
        search_radius_km: None,
        platforms,
    }
}

fn listing(
    platform: Platform,
    id: &str,
    title: &str,
    price: Option<f64>,
    rating: Option<f64>,
    coordinate: Option<GeoPoint>,
) -> ListingRecord {
    ListingRecord {
        platform,
        listing_id: id.to_string(),
        title: title.to_string(),
        price_per_night: price,
        currency: price.map(|_| "CHF".to_string()),
        rating,
        num_reviews: None,
        coordinate,
        address: None,
        image_urls: vec![],
        url: format!("https://{}.test/{}", platform, id),
        distance_km: None,
        sources: vec![platform],
    }
}

#[test]
fn test_empty_platform_set_is_invalid() {
    let json = r#"{
        "location": "Zermatt",
        "checkIn": "2026-01-10",
        "checkOut": "2026-01-17",
        "guests": 2,
        "platforms": []
    }"#;
    let req: stay_scout::StartSearchRequest = serde_json::from_str(json).unwrap();
    assert!(req.validate().is_err());
}

#[test]
fn test_unknown_platform_rejected_by_deserialization() {
    let json = r#"{
        "location": "Zermatt",
        "checkIn": "2026-01-10",
        "checkOut": "2026-01-17",
        "platforms": ["myspace"]
    }"#;
    assert!(serde_json::from_str::<stay_scout::StartSearchRequest>(json).is_err());
}

#[test]
fn test_cozy_cabin_merges_across_platforms() {
    // Same cabin listed on both platforms with slightly different titles,
    // coordinates and prices
    let airbnb = listing(
        Platform::Airbnb,
        "a1",
        "Cozy Cabin",
        Some(120.0),
        Some(4.8),
        Some(GeoPoint {
            lat: 46.02,
            lon: 7.75,
        }),
    );
    let booking = listing(
        Platform::Booking,
        "b1",
        "cozy cabin ",
        Some(122.0),
        None,
        Some(GeoPoint {
            lat: 46.0201,
            lon: 7.7501,
        }),
    );

    let request = search_request(vec![Platform::Airbnb, Platform::Booking]);
    let result = Aggregator::with_defaults().aggregate(vec![airbnb, booking], &request);

    assert_eq!(result.listings.len(), 1);
    assert_eq!(
        result.listings[0].sources,
        vec![Platform::Airbnb, Platform::Booking]
    );
    // The rated record wins and keeps its rating
    assert_eq!(result.listings[0].rating, Some(4.8));
}

#[test]
fn test_dedup_idempotent_on_own_output() {
    let records = vec![
        listing(
            Platform::Airbnb,
            "a1",
            "Cozy Cabin",
            Some(120.0),
            Some(4.8),
            Some(GeoPoint {
                lat: 46.02,
                lon: 7.75,
            }),
        ),
        listing(
            Platform::Booking,
            "b1",
            "Cozy Cabin",
            Some(122.0),
            None,
            Some(GeoPoint {
                lat: 46.0201,
                lon: 7.7501,
            }),
        ),
        listing(Platform::Expedia, "e1", "Hotel Matterhorn", Some(300.0), Some(4.2), None),
        listing(Platform::HotelsCom, "h1", "Hotel Bristol", None, None, None),
    ];

    let tolerances = DedupTolerances::default();
    let once = dedupe(records, &tolerances);
    let twice = dedupe(once.clone(), &tolerances);

    assert_eq!(once.len(), twice.len());
    for (a, b) in once.iter().zip(twice.iter()) {
        assert_eq!(a.listing_id, b.listing_id);
        assert_eq!(a.sources, b.sources);
    }
}

#[test]
fn test_ranking_deterministic_under_permutation() {
    let records = vec![
        listing(Platform::Airbnb, "a1", "Alpha", Some(120.0), Some(4.1), None),
        listing(Platform::Airbnb, "a2", "Beta", Some(95.0), Some(4.7), None),
        listing(Platform::Booking, "b1", "Gamma", Some(140.0), Some(4.7), None),
        listing(Platform::Expedia, "e1", "Delta", None, None, None),
        listing(Platform::HotelsCom, "h1", "Epsilon", Some(80.0), Some(3.9), None),
    ];
    let request = search_request(vec![
        Platform::Airbnb,
        Platform::Booking,
        Platform::HotelsCom,
        Platform::Expedia,
    ]);
    let aggregator = Aggregator::with_defaults();

    let baseline: Vec<String> = aggregator
        .aggregate(records.clone(), &request)
        .listings
        .iter()
        .map(|l| l.listing_id.clone())
        .collect();

    // A few hand-rolled permutations
    let permutations: Vec<Vec<usize>> = vec![
        vec![4, 3, 2, 1, 0],
        vec![2, 0, 4, 1, 3],
        vec![1, 4, 0, 3, 2],
    ];
    for order in permutations {
        let shuffled: Vec<ListingRecord> =
            order.iter().map(|&i| records[i].clone()).collect();
        let ids: Vec<String> = aggregator
            .aggregate(shuffled, &request)
            .listings
            .iter()
            .map(|l| l.listing_id.clone())
            .collect();
        assert_eq!(ids, baseline);
    }
}

#[test]
fn test_min_rating_admits_unknown_excludes_known_low() {
    let mut request = search_request(vec![Platform::Airbnb]);
    request.min_rating = Some(4.5);

    let rated_low = listing(Platform::Airbnb, "a1", "Low", Some(100.0), Some(4.0), None);
    let unrated = listing(Platform::Airbnb, "a2", "Unknown", Some(100.0), None, None);

    assert!(!passes_filters(&rated_low, &request));
    assert!(passes_filters(&unrated, &request));

    // With min_rating absent, both are admitted
    request.min_rating = None;
    assert!(passes_filters(&rated_low, &request));
    assert!(passes_filters(&unrated, &request));
}

#[test]
fn test_normalize_converts_hotel_scales() {
    let raw = RawListing {
        title: Some("Hotel Alpenblick".to_string()),
        url: Some("https://www.booking.com/hotel/ch/alpenblick.html".to_string()),
        rating: Some(9.0),
        ..RawListing::default()
    };
    let record = normalize(Platform::Booking, raw).unwrap();
    assert_eq!(record.rating, Some(4.5));

    let raw = RawListing {
        title: Some("Chalet".to_string()),
        url: Some("https://www.airbnb.ch/rooms/7".to_string()),
        rating: Some(4.5),
        ..RawListing::default()
    };
    let record = normalize(Platform::Airbnb, raw).unwrap();
    assert_eq!(record.rating, Some(4.5));
}

#[test]
fn test_absent_numbers_stay_absent_through_aggregation() {
    let record = listing(Platform::Airbnb, "a1", "No Data", None, None, None);
    let request = search_request(vec![Platform::Airbnb]);

    let result = Aggregator::with_defaults().aggregate(vec![record], &request);
    assert_eq!(result.listings.len(), 1);
    assert_eq!(result.listings[0].price_per_night, None);
    assert_eq!(result.listings[0].rating, None);
    assert_eq!(result.listings[0].num_reviews, None);
}
