use crate::core::geo::haversine_km;
use crate::models::{DedupTolerances, ListingRecord};

/// Merge cross-platform duplicates.
///
/// Two records count as the same listing when their normalized titles match,
/// their locations agree within tolerance, and their nightly prices agree
/// within the relative tolerance. Unknown location or price on either side
/// never blocks a merge; only a known disagreement does.
pub fn dedupe(records: Vec<ListingRecord>, tolerances: &DedupTolerances) -> Vec<ListingRecord> {
    let mut merged: Vec<ListingRecord> = Vec::with_capacity(records.len());

    for record in records {
        match merged
            .iter_mut()
            .find(|kept| is_same_listing(kept, &record, tolerances))
        {
            Some(kept) => merge_into(kept, record),
            None => merged.push(record),
        }
    }

    merged
}

/// Case- and whitespace-insensitive title key
pub fn normalized_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_same_listing(a: &ListingRecord, b: &ListingRecord, tol: &DedupTolerances) -> bool {
    if normalized_title(&a.title) != normalized_title(&b.title) {
        return false;
    }

    let location_agrees = match (&a.coordinate, &b.coordinate) {
        (Some(ca), Some(cb)) => haversine_km(ca, cb) <= tol.geo_tolerance_km,
        _ => match (&a.address, &b.address) {
            (Some(x), Some(y)) => x.trim().eq_ignore_ascii_case(y.trim()),
            // no location data to compare; the title match carries
            _ => true,
        },
    };
    if !location_agrees {
        return false;
    }

    match (a.price_per_night, b.price_per_night) {
        (Some(pa), Some(pb)) => {
            let base = pa.max(pb);
            base == 0.0 || (pa - pb).abs() / base <= tol.price_tolerance
        }
        _ => true,
    }
}

/// Known-field count used to pick the surviving record of a merge
fn completeness(record: &ListingRecord) -> usize {
    record.price_per_night.is_some() as usize
        + record.rating.is_some() as usize
        + record.num_reviews.is_some() as usize
        + record.coordinate.is_some() as usize
        + record.distance_km.is_some() as usize
        + !record.image_urls.is_empty() as usize
}

fn merge_into(kept: &mut ListingRecord, incoming: ListingRecord) {
    let (mut winner, loser) = if completeness(&incoming) > completeness(kept) {
        (incoming, kept.clone())
    } else {
        (kept.clone(), incoming)
    };

    if winner.rating.is_none() {
        winner.rating = loser.rating;
    }
    if winner.num_reviews.is_none() {
        winner.num_reviews = loser.num_reviews;
    }
    if winner.price_per_night.is_none() {
        winner.price_per_night = loser.price_per_night;
        winner.currency = loser.currency;
    }
    if winner.distance_km.is_none() {
        winner.distance_km = loser.distance_km;
    }
    if winner.coordinate.is_none() {
        winner.coordinate = loser.coordinate;
    }
    if winner.address.is_none() {
        winner.address = loser.address;
    }
    if winner.image_urls.is_empty() {
        winner.image_urls = loser.image_urls;
    }
    for source in loser.sources {
        if !winner.sources.contains(&source) {
            winner.sources.push(source);
        }
    }
    winner.sources.sort();

    *kept = winner;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, Platform};

    fn record(
        platform: Platform,
        id: &str,
        title: &str,
        price: Option<f64>,
        coordinate: Option<GeoPoint>,
    ) -> ListingRecord {
        ListingRecord {
            platform,
            listing_id: id.to_string(),
            title: title.to_string(),
            price_per_night: price,
            currency: price.map(|_| "CHF".to_string()),
            rating: None,
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
    fn test_cross_platform_merge() {
        let a = record(
            Platform::Airbnb,
            "a1",
            "Cozy Cabin",
            Some(120.0),
            Some(GeoPoint {
                lat: 46.02,
                lon: 7.75,
            }),
        );
        let b = record(
            Platform::Booking,
            "b1",
            "cozy cabin ",
            Some(122.0),
            Some(GeoPoint {
                lat: 46.0201,
                lon: 7.7501,
            }),
        );

        let merged = dedupe(vec![a, b], &DedupTolerances::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].sources,
            vec![Platform::Airbnb, Platform::Booking]
        );
    }

    #[test]
    fn test_distant_listings_not_merged() {
        let a = record(
            Platform::Airbnb,
            "a1",
            "Cozy Cabin",
            Some(120.0),
            Some(GeoPoint {
                lat: 46.02,
                lon: 7.75,
            }),
        );
        let b = record(
            Platform::Booking,
            "b1",
            "Cozy Cabin",
            Some(120.0),
            Some(GeoPoint {
                lat: 46.5,
                lon: 7.75,
            }),
        );

        let merged = dedupe(vec![a, b], &DedupTolerances::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_price_disagreement_blocks_merge() {
        let a = record(Platform::Airbnb, "a1", "Cozy Cabin", Some(120.0), None);
        let b = record(Platform::Booking, "b1", "Cozy Cabin", Some(180.0), None);

        let merged = dedupe(vec![a, b], &DedupTolerances::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_unknown_price_does_not_block_merge() {
        let a = record(Platform::Airbnb, "a1", "Cozy Cabin", Some(120.0), None);
        let b = record(Platform::Booking, "b1", "Cozy Cabin", None, None);

        let merged = dedupe(vec![a, b], &DedupTolerances::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].price_per_night, Some(120.0));
    }

    #[test]
    fn test_winner_backfills_from_loser() {
        let mut a = record(Platform::Airbnb, "a1", "Cozy Cabin", Some(120.0), None);
        a.rating = Some(4.5);
        a.num_reviews = Some(40);
        let mut b = record(Platform::Booking, "b1", "Cozy Cabin", Some(121.0), None);
        b.distance_km = Some(1.2);

        let merged = dedupe(vec![a, b], &DedupTolerances::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].rating, Some(4.5));
        assert_eq!(merged[0].distance_km, Some(1.2));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let records = vec![
            record(
                Platform::Airbnb,
                "a1",
                "Cozy Cabin",
                Some(120.0),
                Some(GeoPoint {
                    lat: 46.02,
                    lon: 7.75,
                }),
            ),
            record(
                Platform::Booking,
                "b1",
                "Cozy Cabin",
                Some(122.0),
                Some(GeoPoint {
                    lat: 46.0201,
                    lon: 7.7501,
                }),
            ),
            record(Platform::Expedia, "e1", "Hotel Matterhorn", Some(250.0), None),
        ];

        let tolerances = DedupTolerances::default();
        let once = dedupe(records, &tolerances);
        let twice = dedupe(once.clone(), &tolerances);
        assert_eq!(once.len(), twice.len());
    }
}
