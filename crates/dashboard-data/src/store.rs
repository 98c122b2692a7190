//! Normalisation of raw listing rows into a typed per-city dataset.

use dashboard_core::models::{CityDataset, Listing, RawListing};
use dashboard_core::month::normalize_month;
use tracing::debug;

/// Stateless builder that turns provider rows into a [`CityDataset`].
pub struct RecordStore;

impl RecordStore {
    /// Build the dataset for `city` from `rows`, without boundary geometry.
    ///
    /// Rows without a neighbourhood, a finite price, or a recognisable date are
    /// dropped. An empty or fully invalid input yields an empty dataset.
    pub fn ingest(rows: impl IntoIterator<Item = RawListing>, city: &str) -> CityDataset {
        Self::ingest_with_geometry(rows, city, None)
    }

    /// Same as [`RecordStore::ingest`], attaching the city's neighbourhood
    /// boundaries as an opaque value.
    pub fn ingest_with_geometry(
        rows: impl IntoIterator<Item = RawListing>,
        city: &str,
        geometry: Option<serde_json::Value>,
    ) -> CityDataset {
        let mut rows_read = 0usize;
        let listings: Vec<Listing> = rows
            .into_iter()
            .inspect(|_| rows_read += 1)
            .filter_map(|row| normalize_row(row, city))
            .collect();

        debug!(
            "City {}: {} rows read, {} dropped, {} kept",
            city,
            rows_read,
            rows_read - listings.len(),
            listings.len()
        );

        CityDataset::new(city, listings, geometry)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Map a raw row to a [`Listing`], returning `None` when a required field is
/// missing.
fn normalize_row(row: RawListing, city: &str) -> Option<Listing> {
    let neighborhood = clean_text(row.neighbourhood)?;
    let price = row.price.filter(|p| p.is_finite())?;
    let date = row.date.as_deref().and_then(normalize_month)?;

    Some(Listing {
        id: clean_text(row.id).unwrap_or_default(),
        name: clean_text(row.name),
        city: city.to_string(),
        neighborhood,
        date,
        price,
        rating: finite(row.rating),
        review_count: to_count(row.review_count),
        host_id: clean_text(row.host_id),
        host_name: clean_text(row.host_name),
        host_total_listings_count: to_count(row.host_total_listings_count),
        room_type: clean_text(row.room_type),
        minimum_nights: to_count(row.minimum_nights),
        reviews_per_month: finite(row.reviews_per_month),
        confidence_lower: finite(row.confidence_lower),
        confidence_upper: finite(row.confidence_upper),
        best_model: clean_text(row.best_model),
    })
}

/// Trim a text cell; blank cells become `None`.
fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Integer counts are often written as floats (`"12.0"`) by dataframe exports.
fn to_count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u32::MAX))
        .map(|v| v.round() as u32)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
