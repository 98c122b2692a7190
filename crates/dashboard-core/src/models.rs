use serde::{Deserialize, Serialize};

use crate::month::YearMonth;

/// One un-validated listing row as handed over by a data provider.
///
/// Field names follow the headers of the combined per-city listing files.
/// Every field is optional: validation happens when the row is ingested, and
/// numeric cells that fail to parse are read as absent rather than failing
/// the whole row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
    #[serde(default, rename = "neighbourhood_cleansed")]
    pub neighbourhood: Option<String>,
    #[serde(default, rename = "review_scores_rating", deserialize_with = "csv::invalid_option")]
    pub rating: Option<f64>,
    #[serde(default, rename = "number_of_reviews", deserialize_with = "csv::invalid_option")]
    pub review_count: Option<f64>,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub host_total_listings_count: Option<f64>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub minimum_nights: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub reviews_per_month: Option<f64>,
    #[serde(default, rename = "conf_int_lower", deserialize_with = "csv::invalid_option")]
    pub confidence_lower: Option<f64>,
    #[serde(default, rename = "conf_int_upper", deserialize_with = "csv::invalid_option")]
    pub confidence_upper: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub best_model: Option<String>,
}

/// A validated property-listing observation for one month.
///
/// Every `Listing` has a non-empty `neighborhood` and a finite `price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Opaque listing identifier (empty when the source had none).
    pub id: String,
    /// Listing title.
    pub name: Option<String>,
    /// City the listing was loaded for.
    pub city: String,
    /// Cleansed neighbourhood name.
    pub neighborhood: String,
    /// Observation month.
    pub date: YearMonth,
    /// Nightly price.
    pub price: f64,
    /// Review score, if the listing has been rated.
    pub rating: Option<f64>,
    /// Total number of reviews.
    pub review_count: Option<u32>,
    pub host_id: Option<String>,
    pub host_name: Option<String>,
    pub host_total_listings_count: Option<u32>,
    pub room_type: Option<String>,
    pub minimum_nights: Option<u32>,
    pub reviews_per_month: Option<f64>,
    /// Lower bound of the predicted price interval.
    pub confidence_lower: Option<f64>,
    /// Upper bound of the predicted price interval.
    pub confidence_upper: Option<f64>,
    /// Label of the forecasting model that produced the bounds.
    pub best_model: Option<String>,
}

/// All listings of one city plus that city's neighbourhood boundaries.
///
/// Built once when the data is loaded and read-only afterwards. The geometry
/// is passed through untouched for the map renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CityDataset {
    city: String,
    listings: Vec<Listing>,
    geometry: Option<serde_json::Value>,
}

impl CityDataset {
    pub fn new(
        city: impl Into<String>,
        listings: Vec<Listing>,
        geometry: Option<serde_json::Value>,
    ) -> Self {
        Self {
            city: city.into(),
            listings,
            geometry,
        }
    }

    /// A dataset with no listings and no geometry.
    pub fn empty(city: impl Into<String>) -> Self {
        Self::new(city, Vec::new(), None)
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Neighbourhood boundary GeoJSON, if the provider supplied one.
    pub fn geometry(&self) -> Option<&serde_json::Value> {
        self.geometry.as_ref()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Distinct months present in the dataset, in chronological order.
    pub fn months(&self) -> Vec<YearMonth> {
        let mut months: Vec<YearMonth> = self.listings.iter().map(|l| l.date).collect();
        months.sort();
        months.dedup();
        months
    }

    /// Distinct neighbourhood names in order of first appearance.
    pub fn neighborhoods(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.listings
            .iter()
            .map(|l| l.neighborhood.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    }
}
