use crate::models::{GeoPoint, ListingRecord, Platform};
use crate::scrapers::RawListing;

/// Convert a platform-specific raw result into the canonical listing shape.
///
/// Returns `None` for records too malformed to use (no title or no URL);
/// those are logged and dropped rather than failing the batch. Ratings are
/// converted from the platform's native scale to 0-5, out-of-range numbers
/// degrade to unknown rather than being clamped into fake values.
pub fn normalize(platform: Platform, raw: RawListing) -> Option<ListingRecord> {
    let title = raw
        .title
        .as_deref()
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty());

    let Some(title) = title else {
        tracing::warn!("Dropping {} record without title: {:?}", platform, raw.url);
        return None;
    };

    let Some(url) = raw.url.filter(|u| !u.trim().is_empty()) else {
        tracing::warn!("Dropping {} record without URL: {}", platform, title);
        return None;
    };

    let listing_id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| id_from_url(&url));

    let price_per_night = raw
        .price_per_night
        .filter(|p| p.is_finite() && *p >= 0.0);
    let currency = if price_per_night.is_some() {
        raw.currency
    } else {
        None
    };

    let rating = raw
        .rating
        .filter(|r| r.is_finite() && *r >= 0.0 && *r <= platform.rating_scale())
        .map(|r| r / platform.rating_scale() * 5.0);

    let coordinate = match (raw.latitude, raw.longitude) {
        (Some(lat), Some(lon))
            if lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0 && lon.abs() <= 180.0 =>
        {
            Some(GeoPoint { lat, lon })
        }
        _ => None,
    };

    Some(ListingRecord {
        platform,
        listing_id,
        title,
        price_per_night,
        currency,
        rating,
        num_reviews: raw.num_reviews,
        coordinate,
        address: raw
            .address
            .map(|a| collapse_whitespace(&a))
            .filter(|a| !a.is_empty()),
        image_urls: raw.image_urls,
        url,
        distance_km: raw.distance_km.filter(|d| d.is_finite() && *d >= 0.0),
        sources: vec![platform],
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fallback listing id: last non-empty path segment of the URL
fn id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.split('?').next())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(url)
        .to_string()
}
