//! Per-neighbourhood monthly statistics.
//!
//! Feeds the map view: one average price / average rating / listing count per
//! `(neighbourhood, month)` group that actually has listings.

use std::collections::BTreeMap;

use dashboard_core::models::{CityDataset, Listing};
use dashboard_core::month::YearMonth;
use serde::Serialize;

// ── NeighborhoodMonthStat ─────────────────────────────────────────────────────

/// Aggregate figures for one neighbourhood in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodMonthStat {
    pub neighborhood: String,
    pub month: YearMonth,
    /// Mean nightly price.
    pub avg_price: f64,
    /// Mean review score over rated listings; `None` when none were rated.
    pub avg_rating: Option<f64>,
    /// Mean number of reviews over listings that report one.
    pub avg_review_count: Option<f64>,
    /// Number of listings in the group.
    pub listing_count: u32,
}

/// Group key: `(neighbourhood, month)`.
pub type StatKey = (String, YearMonth);

/// Statistics of one city, ordered by neighbourhood then month.
pub type NeighborhoodStats = BTreeMap<StatKey, NeighborhoodMonthStat>;

// ── GroupAccumulator ──────────────────────────────────────────────────────────

/// Raw values collected for one group before the means are taken.
#[derive(Debug, Default)]
struct GroupAccumulator {
    prices: Vec<f64>,
    ratings: Vec<f64>,
    review_counts: Vec<f64>,
}

impl GroupAccumulator {
    fn add_listing(&mut self, listing: &Listing) {
        self.prices.push(listing.price);
        if let Some(rating) = listing.rating {
            self.ratings.push(rating);
        }
        if let Some(count) = listing.review_count {
            self.review_counts.push(f64::from(count));
        }
    }

    fn finish(self, (neighborhood, month): StatKey) -> NeighborhoodMonthStat {
        let listing_count = self.prices.len() as u32;
        NeighborhoodMonthStat {
            neighborhood,
            month,
            avg_price: canonical_mean(self.prices).unwrap_or(0.0),
            avg_rating: canonical_mean(self.ratings),
            avg_review_count: canonical_mean(self.review_counts),
            listing_count,
        }
    }
}

/// Mean of `values`, summed in sorted order so the result does not depend on
/// the order the rows arrived in.
fn canonical_mean(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let sum: f64 = values.iter().sum();
    Some(sum / values.len() as f64)
}

// ── AggregationEngine ─────────────────────────────────────────────────────────

/// Stateless helper that groups listings by neighbourhood and month.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Compute the statistics of every `(neighbourhood, month)` group in
    /// `dataset`. Groups without listings never appear.
    pub fn aggregate(dataset: &CityDataset) -> NeighborhoodStats {
        Self::aggregate_listings(dataset.listings())
    }

    /// Same as [`AggregationEngine::aggregate`] over an arbitrary selection.
    pub fn aggregate_listings<'a>(
        listings: impl IntoIterator<Item = &'a Listing>,
    ) -> NeighborhoodStats {
        let mut groups: BTreeMap<StatKey, GroupAccumulator> = BTreeMap::new();

        for listing in listings {
            groups
                .entry((listing.neighborhood.clone(), listing.date))
                .or_default()
                .add_listing(listing);
        }

        groups
            .into_iter()
            .map(|(key, acc)| (key.clone(), acc.finish(key)))
            .collect()
    }

    /// The groups of a single month, ordered by neighbourhood.
    pub fn for_month(stats: &NeighborhoodStats, month: YearMonth) -> Vec<&NeighborhoodMonthStat> {
        stats.values().filter(|s| s.month == month).collect()
    }

    /// Lowest and highest average price in `slice`, the ends of the map's
    /// colour scale. `None` for an empty slice.
    pub fn price_range(slice: &[&NeighborhoodMonthStat]) -> Option<(f64, f64)> {
        slice.iter().map(|s| s.avg_price).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
