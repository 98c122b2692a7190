//! The closed set of listing-table columns.
//!
//! Column keys match the headers of the source listing files so that
//! selectors written against the files keep working; labels are what the
//! table header shows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;
use crate::models::Listing;
use crate::month::YearMonth;

/// A column the listing table can display or sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "review_scores_rating")]
    Rating,
    #[serde(rename = "host_id")]
    HostId,
    #[serde(rename = "host_name")]
    HostName,
    #[serde(rename = "room_type")]
    RoomType,
    #[serde(rename = "number_of_reviews")]
    ReviewCount,
    #[serde(rename = "minimum_nights")]
    MinimumNights,
    #[serde(rename = "reviews_per_month")]
    ReviewsPerMonth,
    #[serde(rename = "neighbourhood_cleansed")]
    Neighborhood,
    #[serde(rename = "month")]
    Month,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Id,
        Column::Name,
        Column::Price,
        Column::Rating,
        Column::HostId,
        Column::HostName,
        Column::RoomType,
        Column::ReviewCount,
        Column::MinimumNights,
        Column::ReviewsPerMonth,
        Column::Neighborhood,
        Column::Month,
    ];

    /// Columns every table shows, in display order.
    pub const BASE: [Column; 4] = [Column::Id, Column::Price, Column::Name, Column::Rating];

    /// Columns offered as optional additions to the base set.
    pub const ADDITIONAL: [Column; 4] = [
        Column::HostName,
        Column::RoomType,
        Column::ReviewCount,
        Column::MinimumNights,
    ];

    /// Columns offered in the sort selector.
    pub const SORTABLE: [Column; 7] = [
        Column::Price,
        Column::Rating,
        Column::Name,
        Column::HostName,
        Column::RoomType,
        Column::ReviewCount,
        Column::MinimumNights,
    ];

    /// Column used when the caller does not pick one.
    pub const DEFAULT_SORT: Column = Column::Rating;

    /// Source-file header for this column.
    pub fn key(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Price => "price",
            Column::Rating => "review_scores_rating",
            Column::HostId => "host_id",
            Column::HostName => "host_name",
            Column::RoomType => "room_type",
            Column::ReviewCount => "number_of_reviews",
            Column::MinimumNights => "minimum_nights",
            Column::ReviewsPerMonth => "reviews_per_month",
            Column::Neighborhood => "neighbourhood_cleansed",
            Column::Month => "month",
        }
    }

    /// Header label shown in the table.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Name => "Name",
            Column::Price => "Price",
            Column::Rating => "Rating",
            Column::HostId => "Host ID",
            Column::HostName => "Host",
            Column::RoomType => "Room Type",
            Column::ReviewCount => "Reviews",
            Column::MinimumNights => "Min. Nights",
            Column::ReviewsPerMonth => "Reviews/Month",
            Column::Neighborhood => "Neighbourhood",
            Column::Month => "Month",
        }
    }

    /// Whether the column holds numbers (right-aligned when printed).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::Price
                | Column::Rating
                | Column::ReviewCount
                | Column::MinimumNights
                | Column::ReviewsPerMonth
        )
    }

    /// Extract this column's cell from `listing`.
    pub fn value(&self, listing: &Listing) -> CellValue {
        fn text(v: &Option<String>) -> CellValue {
            v.as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing)
        }
        fn number(v: Option<f64>) -> CellValue {
            v.map(CellValue::Number).unwrap_or(CellValue::Missing)
        }
        fn count(v: Option<u32>) -> CellValue {
            v.map(CellValue::Count).unwrap_or(CellValue::Missing)
        }

        match self {
            Column::Id if listing.id.is_empty() => CellValue::Missing,
            Column::Id => CellValue::Text(listing.id.clone()),
            Column::Name => text(&listing.name),
            Column::Price => CellValue::Number(listing.price),
            Column::Rating => number(listing.rating),
            Column::HostId => text(&listing.host_id),
            Column::HostName => text(&listing.host_name),
            Column::RoomType => text(&listing.room_type),
            Column::ReviewCount => count(listing.review_count),
            Column::MinimumNights => count(listing.minimum_nights),
            Column::ReviewsPerMonth => number(listing.reviews_per_month),
            Column::Neighborhood => CellValue::Text(listing.neighborhood.clone()),
            Column::Month => CellValue::Month(listing.date),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Column {
    type Err = DashboardError;

    /// Accepts the source-file key (`"review_scores_rating"`) or the display
    /// label (`"Rating"`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DashboardError::UnknownColumn(s.to_string()))
    }
}

// ── CellValue ─────────────────────────────────────────────────────────────────

/// One projected table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Count(u32),
    Month(YearMonth),
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_key_and_label() {
        assert_eq!("review_scores_rating".parse::<Column>().unwrap(), Column::Rating);
        assert_eq!("Rating".parse::<Column>().unwrap(), Column::Rating);
        assert_eq!("min. nights".parse::<Column>().unwrap(), Column::MinimumNights);
        assert_eq!(" price ".parse::<Column>().unwrap(), Column::Price);
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        let err = "bedrooms".parse::<Column>().unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn(ref c) if c == "bedrooms"));
    }

    #[test]
    fn test_numeric_columns() {
        assert!(Column::Price.is_numeric());
        assert!(Column::MinimumNights.is_numeric());
        assert!(!Column::Id.is_numeric());
        assert!(!Column::HostName.is_numeric());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<&str> = Column::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), Column::ALL.len());
    }

    #[test]
    fn test_serde_uses_key() {
        let json = serde_json::to_string(&Column::ReviewCount).unwrap();
        assert_eq!(json, r#""number_of_reviews""#);
    }

    #[test]
    fn test_missing_cell_serialises_as_null() {
        let json = serde_json::to_string(&CellValue::Missing).unwrap();
        assert_eq!(json, "null");
        let json = serde_json::to_string(&CellValue::Count(3)).unwrap();
        assert_eq!(json, "3");
    }
}
