//! The dashboard's loaded state: one dataset per city plus everything derived
//! from it once at load time.

use std::collections::BTreeMap;

use dashboard_core::catalog::Viewport;
use dashboard_core::error::Result;
use dashboard_core::models::CityDataset;
use dashboard_core::month::YearMonth;
use dashboard_data::aggregator::{AggregationEngine, NeighborhoodMonthStat, NeighborhoodStats};
use dashboard_data::query::{Query, QueryEngine, TableView};
use dashboard_data::reader::DataProvider;
use dashboard_data::store::RecordStore;
use dashboard_data::timeseries::{Series, SeriesKind, TimeSeriesSplitter};
use serde::Serialize;
use tracing::{debug, info, warn};

static NO_STATS: NeighborhoodStats = BTreeMap::new();

/// Everything the map view needs for one city and month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView<'a> {
    pub city: &'a str,
    pub month: YearMonth,
    /// Neighbourhoods with listings in `month`, ordered by name.
    pub stats: Vec<&'a NeighborhoodMonthStat>,
    /// Ends of the colour scale: lowest and highest average price.
    pub price_range: Option<(f64, f64)>,
    pub viewport: Option<Viewport>,
    pub geometry: Option<&'a serde_json::Value>,
}

impl MapView<'_> {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

// ── DashboardContext ──────────────────────────────────────────────────────────

/// Immutable per-city datasets and their statistics.
///
/// Built once, then only read; safe to share between threads by reference.
#[derive(Debug, Clone, Default)]
pub struct DashboardContext {
    /// Cities in load order.
    pub(crate) cities: Vec<String>,
    pub(crate) datasets: BTreeMap<String, CityDataset>,
    stats: BTreeMap<String, NeighborhoodStats>,
    viewports: BTreeMap<String, Viewport>,
    /// Sorted unique months over every city.
    pub(crate) date_marks: Vec<YearMonth>,
}

impl DashboardContext {
    /// Fetch and ingest every city the provider offers.
    ///
    /// A city whose fetch fails is left out and logged; the others still load.
    pub fn load<P: DataProvider + ?Sized>(provider: &P) -> Self {
        let mut datasets = Vec::new();
        let mut viewports = BTreeMap::new();

        for city in provider.cities() {
            match provider.fetch(&city) {
                Ok(source) => {
                    datasets.push(RecordStore::ingest_with_geometry(
                        source.rows,
                        &city,
                        source.geometry,
                    ));
                    if let Some(viewport) = provider.viewport(&city) {
                        viewports.insert(city, viewport);
                    }
                }
                Err(e) => warn!("Skipping city {}: {}", city, e),
            }
        }

        let mut context = Self::from_datasets(datasets);
        context.viewports = viewports;
        context
    }

    /// Build a context from already-ingested datasets, keeping their order.
    pub fn from_datasets(datasets: impl IntoIterator<Item = CityDataset>) -> Self {
        let mut context = Self::default();

        for dataset in datasets {
            let city = dataset.city().to_string();
            let stats = AggregationEngine::aggregate(&dataset);
            debug!(
                "City {}: {} listings, {} neighbourhood-month groups",
                city,
                dataset.len(),
                stats.len()
            );
            if !context.datasets.contains_key(&city) {
                context.cities.push(city.clone());
            }
            context.stats.insert(city.clone(), stats);
            context.datasets.insert(city, dataset);
        }

        let mut marks: Vec<YearMonth> = context
            .datasets
            .values()
            .flat_map(|d| d.months())
            .collect();
        marks.sort();
        marks.dedup();
        context.date_marks = marks;

        info!(
            "Loaded {} cities spanning {} months",
            context.cities.len(),
            context.date_marks.len()
        );
        context
    }

    pub fn datasets(&self) -> &BTreeMap<String, CityDataset> {
        &self.datasets
    }

    pub fn dataset(&self, city: &str) -> Option<&CityDataset> {
        self.datasets.get(city)
    }

    /// Neighbourhood-month statistics of `city`; empty for an unknown city.
    pub fn stats(&self, city: &str) -> &NeighborhoodStats {
        self.stats.get(city).unwrap_or(&NO_STATS)
    }

    /// Map view of `city` in `month`.
    pub fn map_view<'a>(&'a self, city: &'a str, month: YearMonth) -> MapView<'a> {
        let stats = AggregationEngine::for_month(self.stats(city), month);
        let price_range = AggregationEngine::price_range(&stats);
        MapView {
            city,
            month,
            stats,
            price_range,
            viewport: self.viewports.get(city).copied(),
            geometry: self.datasets.get(city).and_then(|d| d.geometry()),
        }
    }

    /// Table view for `query`.
    pub fn query(&self, query: &Query) -> Result<TableView<'_>> {
        QueryEngine::run(&self.datasets, query)
    }

    /// Price or rating chart of one neighbourhood over every loaded month.
    pub fn timeseries(&self, city: &str, neighborhood: &str, kind: SeriesKind) -> Series {
        let listings = QueryEngine::filter(&self.datasets, city, None, Some(neighborhood));
        TimeSeriesSplitter::series(listings, kind)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
