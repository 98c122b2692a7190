//! Chart series for one neighbourhood: price with forecast tail and
//! confidence band, or mean rating.

use std::collections::BTreeMap;
use std::str::FromStr;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::Listing;
use dashboard_core::month::YearMonth;
use serde::{Deserialize, Serialize};

/// Number of trailing points of a price series that are model forecasts.
///
/// The data provider appends exactly this many forward-looking rows per
/// neighbourhood.
pub const FORECAST_POINTS: usize = 2;

/// Months whose ratings were collected badly and are left out of the rating
/// series.
const EXCLUDED_RATING_MONTHS: [(i32, u32); 2] = [(2024, 10), (2024, 11)];

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Historical,
    Forecast,
}

/// One point of a chart line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub date: YearMonth,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<Segment>,
}

/// Predicted price interval for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPoint {
    pub date: YearMonth,
    pub lower: f64,
    pub upper: f64,
}

/// Mean price over time, split into observed and forecast segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PriceSeries {
    pub historical: Vec<TimeSeriesPoint>,
    pub forecast: Vec<TimeSeriesPoint>,
    /// Segment joining the last historical point to the first forecast point,
    /// so the drawn line has no gap.
    pub connector: Option<[TimeSeriesPoint; 2]>,
    pub confidence_band: Vec<BandPoint>,
    /// Forecasting model named by the forecast rows, if any.
    pub forecast_model: Option<String>,
}

impl PriceSeries {
    /// All points in chronological order.
    pub fn points(&self) -> impl Iterator<Item = &TimeSeriesPoint> {
        self.historical.iter().chain(self.forecast.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.historical.is_empty() && self.forecast.is_empty()
    }

    /// Closed outline of the confidence band: upper bounds left to right, then
    /// lower bounds right to left.
    pub fn band_outline(&self) -> Vec<(YearMonth, f64)> {
        self.confidence_band
            .iter()
            .map(|b| (b.date, b.upper))
            .chain(self.confidence_band.iter().rev().map(|b| (b.date, b.lower)))
            .collect()
    }
}

/// Which chart the neighbourhood view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    #[default]
    Price,
    Rating,
}

impl SeriesKind {
    /// Resolve the chart from the click counters of the two chart buttons:
    /// the rating chart only when it was clicked strictly more often.
    pub fn from_clicks(price_clicks: u32, rating_clicks: u32) -> Self {
        if rating_clicks > price_clicks {
            SeriesKind::Rating
        } else {
            SeriesKind::Price
        }
    }

    /// Chart title for a neighbourhood.
    pub fn title(&self, neighborhood: &str) -> String {
        match self {
            SeriesKind::Price => format!("Price Over Time in {}", neighborhood),
            SeriesKind::Rating => format!("Rating Over Time in {}", neighborhood),
        }
    }
}

impl FromStr for SeriesKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(SeriesKind::Price),
            "rating" => Ok(SeriesKind::Rating),
            _ => Err(DashboardError::InvalidSeriesKind(s.to_string())),
        }
    }
}

/// A computed chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Series {
    Price(PriceSeries),
    Rating { points: Vec<TimeSeriesPoint> },
}

// ── Accumulation ──────────────────────────────────────────────────────────────

/// Running sum and count that ignores absent values.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u32,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

#[derive(Debug, Default)]
struct PriceMonth {
    price: Mean,
    lower: Mean,
    upper: Mean,
    model: Option<String>,
}

// ── TimeSeriesSplitter ────────────────────────────────────────────────────────

/// Stateless helper building chart series from a neighbourhood's listings.
pub struct TimeSeriesSplitter;

impl TimeSeriesSplitter {
    /// Mean price per month with the last [`FORECAST_POINTS`] points marked as
    /// forecast.
    ///
    /// With fewer than two points everything is historical; the connector is
    /// only built when at least one historical point precedes the forecast.
    pub fn price_series<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> PriceSeries {
        let mut months: BTreeMap<YearMonth, PriceMonth> = BTreeMap::new();
        for listing in listings {
            let month = months.entry(listing.date).or_default();
            month.price.add(Some(listing.price));
            month.lower.add(listing.confidence_lower);
            month.upper.add(listing.confidence_upper);
            if month.model.is_none() {
                month.model = listing.best_model.clone();
            }
        }

        let n = months.len();
        let forecast_start = if n < FORECAST_POINTS { n } else { n - FORECAST_POINTS };

        let mut series = PriceSeries::default();
        for (i, (date, month)) in months.into_iter().enumerate() {
            let Some(value) = month.price.value() else { continue };
            let is_forecast = i >= forecast_start;

            if let (Some(lower), Some(upper)) = (month.lower.value(), month.upper.value()) {
                series.confidence_band.push(BandPoint { date, lower, upper });
            }

            if is_forecast {
                if series.forecast_model.is_none() {
                    series.forecast_model = month.model;
                }
                series.forecast.push(TimeSeriesPoint {
                    date,
                    value,
                    segment: Some(Segment::Forecast),
                });
            } else {
                series.historical.push(TimeSeriesPoint {
                    date,
                    value,
                    segment: Some(Segment::Historical),
                });
            }
        }

        if let (Some(last), Some(first)) = (series.historical.last(), series.forecast.first()) {
            series.connector = Some([last.clone(), first.clone()]);
        }

        series
    }

    /// Mean rating per month, leaving out October and November 2024.
    ///
    /// Months where no listing was rated produce no point.
    pub fn rating_series<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Vec<TimeSeriesPoint> {
        let mut months: BTreeMap<YearMonth, Mean> = BTreeMap::new();
        for listing in listings {
            if is_excluded_rating_month(listing.date) {
                continue;
            }
            months.entry(listing.date).or_default().add(listing.rating);
        }

        months
            .into_iter()
            .filter_map(|(date, mean)| {
                mean.value().map(|value| TimeSeriesPoint {
                    date,
                    value,
                    segment: None,
                })
            })
            .collect()
    }

    /// Build the chart of the requested kind.
    pub fn series<'a>(listings: impl IntoIterator<Item = &'a Listing>, kind: SeriesKind) -> Series {
        match kind {
            SeriesKind::Price => Series::Price(Self::price_series(listings)),
            SeriesKind::Rating => Series::Rating {
                points: Self::rating_series(listings),
            },
        }
    }
}

fn is_excluded_rating_month(month: YearMonth) -> bool {
    EXCLUDED_RATING_MONTHS
        .iter()
        .any(|&(year, m)| month.year() == year && month.month() == m)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
