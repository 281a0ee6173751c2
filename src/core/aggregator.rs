use std::collections::BTreeMap;

use crate::core::{dedup::dedupe, filters::passes_filters, ranking::rank};
use crate::models::{
    AggregatedResult, DedupTolerances, ListingRecord, Platform, PlatformCounts, RankingWeights,
    SearchRequest,
};

/// Cross-platform merge, filter and rank pipeline
///
/// # Pipeline Stages
/// 1. Drop malformed records (never fail the batch for one bad record)
/// 2. Deduplicate across platforms, tagging merged records with sources
/// 3. Apply the request's filters (unknown values are admitted)
/// 4. Rank by composite score, compute per-platform counters
#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: RankingWeights,
    tolerances: DedupTolerances,
}

impl Aggregator {
    pub fn new(weights: RankingWeights, tolerances: DedupTolerances) -> Self {
        Self {
            weights,
            tolerances,
        }
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: RankingWeights::default(),
            tolerances: DedupTolerances::default(),
        }
    }

    /// Produce the final ranked list from the accumulated records.
    ///
    /// Pure with respect to shared state; the same input always yields the
    /// same output, regardless of the input's ordering.
    pub fn aggregate(
        &self,
        records: Vec<ListingRecord>,
        request: &SearchRequest,
    ) -> AggregatedResult {
        let mut records: Vec<ListingRecord> = records
            .into_iter()
            .filter(|record| {
                if well_formed(record) {
                    true
                } else {
                    tracing::warn!(
                        "Dropping malformed record from {}: {}",
                        record.platform,
                        record.title
                    );
                    false
                }
            })
            .collect();

        // Canonical order makes grouping and merge winners independent of
        // arrival order.
        records.sort_by(|a, b| {
            a.platform
                .as_str()
                .cmp(b.platform.as_str())
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });

        let mut counts: BTreeMap<Platform, PlatformCounts> = request
            .platforms
            .iter()
            .map(|p| {
                (
                    *p,
                    PlatformCounts {
                        requested: true,
                        ..PlatformCounts::default()
                    },
                )
            })
            .collect();

        for record in &records {
            counts.entry(record.platform).or_default().returned += 1;
        }

        let deduped = dedupe(records, &self.tolerances);
        let mut filtered: Vec<ListingRecord> = deduped
            .into_iter()
            .filter(|record| passes_filters(record, request))
            .collect();

        for record in &filtered {
            for source in &record.sources {
                counts.entry(*source).or_default().after_filter += 1;
            }
        }

        rank(&mut filtered, &self.weights);

        AggregatedResult {
            listings: filtered,
            platform_counts: counts,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn well_formed(record: &ListingRecord) -> bool {
    !record.title.trim().is_empty()
        && record.price_per_night.map_or(true, |p| p.is_finite() && p >= 0.0)
        && record
            .rating
            .map_or(true, |r| r.is_finite() && (0.0..=5.0).contains(&r))
        && record.distance_km.map_or(true, |d| d.is_finite() && d >= 0.0)
}
