use std::cmp::Ordering;

use crate::models::{ListingRecord, RankingWeights};

/// Sort records best-first by the weighted composite score.
///
/// Ties (including records where every scored field is unknown) fall back to
/// platform name then listing id, so the ordering is a total order and
/// identical inputs always produce identical output.
pub fn rank(records: &mut [ListingRecord], weights: &RankingWeights) {
    let max_price = records
        .iter()
        .filter_map(|r| r.price_per_night)
        .fold(0.0_f64, f64::max);

    records.sort_by(|a, b| {
        let score_a = composite_score(a, max_price, weights);
        let score_b = composite_score(b, max_price, weights);
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.platform.as_str().cmp(b.platform.as_str()))
            .then_with(|| a.listing_id.cmp(&b.listing_id))
    });
}

/// Composite score in [0, 1]
///
/// Rating dominates, review count (log-scaled, saturating around 1000)
/// breaks rating ties, and a cheaper nightly price lifts the remainder.
/// Unknown fields contribute zero rather than a guessed value.
pub fn composite_score(record: &ListingRecord, max_price: f64, weights: &RankingWeights) -> f64 {
    let rating_score = record.rating.map(|r| (r / 5.0).clamp(0.0, 1.0)).unwrap_or(0.0);

    let review_score = record
        .num_reviews
        .map(|n| ((n as f64 + 1.0).ln() / 1000.0_f64.ln()).min(1.0))
        .unwrap_or(0.0);

    let price_score = match record.price_per_night {
        Some(price) if max_price > 0.0 => 1.0 - (price / max_price).min(1.0),
        _ => 0.0,
    };

    weights.rating * rating_score + weights.reviews * review_score + weights.price * price_score
}
