//! Filtering, sorting and column projection for the listing table.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use dashboard_core::columns::{CellValue, Column};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{CityDataset, Listing};
use dashboard_core::month::YearMonth;
use serde::{Deserialize, Serialize};

// ── SortDirection ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Resolve the direction from the click counters of the two order
    /// buttons: ascending only when it was clicked strictly more often.
    pub fn from_clicks(ascending_clicks: u32, descending_clicks: u32) -> Self {
        if ascending_clicks > descending_clicks {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

impl FromStr for SortDirection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(DashboardError::Config(format!(
                "unknown sort direction: {}",
                other
            ))),
        }
    }
}

// ── Query ─────────────────────────────────────────────────────────────────────

/// One filter/sort request from the table view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub city: String,
    pub month: Option<YearMonth>,
    pub neighborhood: Option<String>,
    /// Column key or label; the rating when `None`.
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
    /// Column keys or labels shown after the base columns.
    #[serde(default)]
    pub extra_columns: Vec<String>,
}

impl Query {
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Self::default()
        }
    }

    pub fn month(mut self, month: YearMonth) -> Self {
        self.month = Some(month);
        self
    }

    pub fn neighborhood(mut self, neighborhood: impl Into<String>) -> Self {
        self.neighborhood = Some(neighborhood.into());
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = direction;
        self
    }

    pub fn extra_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.extra_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

// ── TableView ─────────────────────────────────────────────────────────────────

/// Sorted listings together with the columns to display for them.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a> {
    pub columns: Vec<Column>,
    pub listings: Vec<&'a Listing>,
}

impl<'a> TableView<'a> {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Header labels, in column order.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::label).collect()
    }

    /// Projected cells, one vector per listing.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        self.listings
            .iter()
            .map(|l| self.columns.iter().map(|c| c.value(l)).collect())
            .collect()
    }

    /// Rows as column-key → value records, for JSON output.
    pub fn records(&self) -> Vec<BTreeMap<&'static str, CellValue>> {
        self.listings
            .iter()
            .map(|l| self.columns.iter().map(|c| (c.key(), c.value(l))).collect())
            .collect()
    }
}

// ── QueryEngine ───────────────────────────────────────────────────────────────

/// Stateless helper implementing the table view's filter and sort.
pub struct QueryEngine;

impl QueryEngine {
    /// Listings of `city` matching every supplied predicate, in dataset order.
    ///
    /// An unknown city yields an empty result.
    pub fn filter<'a>(
        datasets: &'a BTreeMap<String, CityDataset>,
        city: &str,
        month: Option<YearMonth>,
        neighborhood: Option<&str>,
    ) -> Vec<&'a Listing> {
        match datasets.get(city) {
            Some(dataset) => Self::filter_dataset(dataset, month, neighborhood),
            None => Vec::new(),
        }
    }

    /// Apply the month and neighbourhood predicates to one dataset.
    pub fn filter_dataset<'a>(
        dataset: &'a CityDataset,
        month: Option<YearMonth>,
        neighborhood: Option<&str>,
    ) -> Vec<&'a Listing> {
        dataset
            .listings()
            .iter()
            .filter(|l| month.map_or(true, |m| l.date == m))
            .filter(|l| neighborhood.map_or(true, |n| l.neighborhood == n))
            .collect()
    }

    /// Sort `listings` and choose the displayed columns.
    ///
    /// The sort is stable and puts missing values last in either direction.
    /// Extra columns are appended to [`Column::BASE`] with duplicates removed,
    /// keeping the first occurrence. Unknown column names are rejected.
    pub fn sort_and_project<'a, S: AsRef<str>>(
        mut listings: Vec<&'a Listing>,
        sort_column: Option<&str>,
        direction: SortDirection,
        extra_columns: &[S],
    ) -> Result<TableView<'a>> {
        let sort_column = match sort_column {
            Some(name) => name.parse::<Column>()?,
            None => Column::DEFAULT_SORT,
        };
        let columns = Self::project_columns(extra_columns)?;

        listings.sort_by(|a, b| compare_cells(&sort_column.value(a), &sort_column.value(b), direction));

        Ok(TableView { columns, listings })
    }

    /// Run a whole [`Query`] against `datasets`.
    pub fn run<'a>(
        datasets: &'a BTreeMap<String, CityDataset>,
        query: &Query,
    ) -> Result<TableView<'a>> {
        let listings = Self::filter(
            datasets,
            &query.city,
            query.month,
            query.neighborhood.as_deref(),
        );
        Self::sort_and_project(
            listings,
            query.sort_column.as_deref(),
            query.sort_direction,
            &query.extra_columns,
        )
    }

    /// Base columns followed by the requested extras, first occurrence wins.
    fn project_columns<S: AsRef<str>>(extra_columns: &[S]) -> Result<Vec<Column>> {
        let mut columns = Column::BASE.to_vec();
        for name in extra_columns {
            let column = name.as_ref().parse::<Column>()?;
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        Ok(columns)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Order two cells for the table sort. Missing values go last regardless of
/// direction. Text cells that parse as integers order numerically ahead of all
/// other text, which orders lexically.
fn compare_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (CellValue::Missing, CellValue::Missing) => return Ordering::Equal,
        (CellValue::Missing, _) => return Ordering::Greater,
        (_, CellValue::Missing) => return Ordering::Less,
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Count(x), CellValue::Count(y)) => x.cmp(y),
        (CellValue::Month(x), CellValue::Month(y)) => x.cmp(y),
        (CellValue::Text(x), CellValue::Text(y)) => text_key(x).cmp(&text_key(y)),
        // A column always yields one cell kind besides Missing.
        _ => Ordering::Equal,
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Sort key for text cells: integers first by value, then everything else.
fn text_key(s: &str) -> (bool, i64, &str) {
    match s.parse::<i64>() {
        Ok(n) => (false, n, s),
        Err(_) => (true, 0, s),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn make_listing(id: &str, neighborhood: &str, month: YearMonth, price: f64, rating: Option<f64>) -> Listing {
        Listing {
            id: id.to_string(),
            name: Some(format!("Listing {}", id)),
            city: "Milan, Italy".to_string(),
            neighborhood: neighborhood.to_string(),
            date: month,
            price,
            rating,
            review_count: None,
            host_id: None,
            host_name: None,
            host_total_listings_count: None,
            room_type: None,
            minimum_nights: None,
            reviews_per_month: None,
            confidence_lower: None,
            confidence_upper: None,
            best_model: None,
        }
    }

    fn datasets() -> BTreeMap<String, CityDataset> {
        let listings = vec![
            make_listing("1", "Brera", ym(2024, 1), 150.0, Some(4.7)),
            make_listing("2", "Brera", ym(2024, 2), 170.0, Some(4.9)),
            make_listing("3", "Navigli", ym(2024, 1), 90.0, None),
            make_listing("4", "Brera", ym(2024, 1), 120.0, Some(4.2)),
        ];
        let mut map = BTreeMap::new();
        map.insert(
            "Milan, Italy".to_string(),
            CityDataset::new("Milan, Italy", listings, None),
        );
        map
    }

    fn ids(listings: &[&Listing]) -> Vec<String> {
        listings.iter().map(|l| l.id.clone()).collect()
    }

    // ── SortDirection ─────────────────────────────────────────────────────

    #[test]
    fn test_direction_from_clicks_tie_is_descending() {
        assert_eq!(SortDirection::from_clicks(0, 0), SortDirection::Descending);
        assert_eq!(SortDirection::from_clicks(3, 3), SortDirection::Descending);
        assert_eq!(SortDirection::from_clicks(1, 2), SortDirection::Descending);
        assert_eq!(SortDirection::from_clicks(2, 1), SortDirection::Ascending);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!("sideways".parse::<SortDirection>().is_err());
    }

    // ── filter ────────────────────────────────────────────────────────────

    #[test]
    fn test_filter_conjunctive() {
        let data = datasets();
        let result = QueryEngine::filter(&data, "Milan, Italy", Some(ym(2024, 1)), Some("Brera"));
        assert_eq!(ids(&result), vec!["1", "4"]);
    }

    #[test]
    fn test_filter_omitted_predicates_match_all() {
        let data = datasets();
        assert_eq!(QueryEngine::filter(&data, "Milan, Italy", None, None).len(), 4);
        assert_eq!(
            QueryEngine::filter(&data, "Milan, Italy", Some(ym(2024, 1)), None).len(),
            3
        );
        assert_eq!(
            QueryEngine::filter(&data, "Milan, Italy", None, Some("Brera")).len(),
            3
        );
    }

    #[test]
    fn test_filter_unknown_city_is_empty() {
        let data = datasets();
        assert!(QueryEngine::filter(&data, "Atlantis", None, None).is_empty());
    }

    #[test]
    fn test_filter_unknown_neighborhood_is_empty() {
        let data = datasets();
        assert!(QueryEngine::filter(&data, "Milan, Italy", None, Some("Nowhere")).is_empty());
    }

    // ── sort_and_project ──────────────────────────────────────────────────

    #[test]
    fn test_default_sort_is_rating_descending_missing_last() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let table =
            QueryEngine::sort_and_project::<&str>(listings, None, SortDirection::default(), &[]).unwrap();
        assert_eq!(ids(&table.listings), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn test_ascending_keeps_missing_last() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let table = QueryEngine::sort_and_project::<&str>(
            listings,
            Some("review_scores_rating"),
            SortDirection::Ascending,
            &[],
        )
        .unwrap();
        assert_eq!(ids(&table.listings), vec!["4", "1", "2", "3"]);
    }

    #[test]
    fn test_sort_by_price_label() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let table =
            QueryEngine::sort_and_project::<&str>(listings, Some("Price"), SortDirection::Ascending, &[])
                .unwrap();
        assert_eq!(ids(&table.listings), vec!["3", "4", "1", "2"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let once =
            QueryEngine::sort_and_project::<&str>(listings, Some("price"), SortDirection::Descending, &[])
                .unwrap();
        let twice = QueryEngine::sort_and_project::<&str>(
            once.listings.clone(),
            Some("price"),
            SortDirection::Descending,
            &[],
        )
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_numeric_ids_sort_numerically() {
        let month = ym(2024, 1);
        let a = make_listing("10", "Brera", month, 1.0, None);
        let b = make_listing("9", "Brera", month, 1.0, None);
        let table =
            QueryEngine::sort_and_project::<&str>(vec![&a, &b], Some("id"), SortDirection::Ascending, &[])
                .unwrap();
        assert_eq!(ids(&table.listings), vec!["9", "10"]);
    }

    #[test]
    fn test_mixed_ids_sort_independent_of_input_order() {
        let month = ym(2024, 1);
        let listings: Vec<Listing> = ["10", "1a", "2", "abc", "007"]
            .iter()
            .map(|id| make_listing(id, "Brera", month, 1.0, None))
            .collect();
        let orders: [[usize; 5]; 3] = [[0, 1, 2, 3, 4], [2, 1, 0, 4, 3], [3, 4, 1, 0, 2]];

        for order in orders {
            let input: Vec<&Listing> = order.iter().map(|&i| &listings[i]).collect();
            let asc = QueryEngine::sort_and_project::<&str>(
                input.clone(),
                Some("id"),
                SortDirection::Ascending,
                &[],
            )
            .unwrap();
            assert_eq!(ids(&asc.listings), vec!["2", "007", "10", "1a", "abc"]);

            let desc =
                QueryEngine::sort_and_project::<&str>(input, Some("id"), SortDirection::Descending, &[])
                    .unwrap();
            assert_eq!(ids(&desc.listings), vec!["abc", "1a", "10", "007", "2"]);
        }
    }

    #[test]
    fn test_unknown_sort_column_rejected() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let err = QueryEngine::sort_and_project::<&str>(listings, Some("bedrooms"), SortDirection::Ascending, &[])
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn(_)));
    }

    #[test]
    fn test_projection_dedupes_and_keeps_order() {
        let data = datasets();
        let listings = QueryEngine::filter(&data, "Milan, Italy", None, None);
        let table = QueryEngine::sort_and_project(
            listings,
            None,
            SortDirection::Descending,
            &["room_type", "price", "host_name", "Room Type"],
        )
        .unwrap();
        assert_eq!(
            table.columns,
            vec![
                Column::Id,
                Column::Price,
                Column::Name,
                Column::Rating,
                Column::RoomType,
                Column::HostName,
            ]
        );
        assert_eq!(
            table.headers(),
            vec!["ID", "Price", "Name", "Rating", "Room Type", "Host"]
        );
    }

    #[test]
    fn test_unknown_extra_column_rejected() {
        let err = QueryEngine::sort_and_project(Vec::new(), None, SortDirection::Descending, &["wifi"])
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnknownColumn(ref c) if c == "wifi"));
    }

    #[test]
    fn test_rows_and_records() {
        let month = ym(2024, 1);
        let l = make_listing("7", "Brera", month, 99.5, None);
        let table = QueryEngine::sort_and_project(vec![&l], None, SortDirection::Descending, &["neighbourhood_cleansed"])
            .unwrap();

        let rows = table.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], CellValue::Text("7".to_string()));
        assert_eq!(rows[0][1], CellValue::Number(99.5));
        assert_eq!(rows[0][3], CellValue::Missing);
        assert_eq!(rows[0][4], CellValue::Text("Brera".to_string()));

        let records = table.records();
        assert_eq!(records[0]["price"], CellValue::Number(99.5));
    }

    #[test]
    fn test_run_whole_query() {
        let data = datasets();
        let query = Query::new("Milan, Italy")
            .month(ym(2024, 1))
            .neighborhood("Brera")
            .sort_by("price", SortDirection::from_clicks(1, 0))
            .extra_columns(["minimum_nights"]);
        let table = QueryEngine::run(&data, &query).unwrap();
        assert_eq!(ids(&table.listings), vec!["4", "1"]);
        assert_eq!(table.columns.last(), Some(&Column::MinimumNights));
    }

    #[test]
    fn test_run_unknown_city_is_empty_ok() {
        let data = datasets();
        let table = QueryEngine::run(&data, &Query::new("Atlantis")).unwrap();
        assert!(table.is_empty());
    }
}
