//! Choices offered by the dashboard's selectors and date slider.

use dashboard_core::columns::Column;
use dashboard_core::month::YearMonth;
use serde::Serialize;

use crate::context::DashboardContext;

/// Months at the end of the slider that only carry forecast rows.
const FORECAST_MARKS: usize = 2;

/// One entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    fn same(text: &str) -> Self {
        Self {
            label: text.to_string(),
            value: text.to_string(),
        }
    }

    fn column(column: Column) -> Self {
        Self {
            label: column.label().to_string(),
            value: column.key().to_string(),
        }
    }
}

impl DashboardContext {
    /// Loaded cities in load order.
    pub fn city_options(&self) -> Vec<SelectOption> {
        self.cities.iter().map(|c| SelectOption::same(c)).collect()
    }

    /// Neighbourhoods of `city` in order of first appearance; empty for an
    /// unknown city.
    pub fn neighborhood_options(&self, city: &str) -> Vec<SelectOption> {
        self.datasets
            .get(city)
            .map(|d| d.neighborhoods().into_iter().map(SelectOption::same).collect())
            .unwrap_or_default()
    }

    /// Columns the table can be sorted by; empty for an unknown city.
    pub fn sort_options(&self, city: &str) -> Vec<SelectOption> {
        self.city_columns(city, &Column::SORTABLE)
    }

    /// Extra columns the table can show; empty for an unknown city.
    pub fn column_options(&self, city: &str) -> Vec<SelectOption> {
        self.city_columns(city, &Column::ADDITIONAL)
    }

    fn city_columns(&self, city: &str, columns: &[Column]) -> Vec<SelectOption> {
        if !self.datasets.contains_key(city) {
            return Vec::new();
        }
        columns.iter().copied().map(SelectOption::column).collect()
    }

    /// Every month present in any city, chronologically; slider position `i`
    /// is `date_marks()[i]`.
    pub fn date_marks(&self) -> &[YearMonth] {
        &self.date_marks
    }

    pub fn month_at(&self, index: usize) -> Option<YearMonth> {
        self.date_marks.get(index).copied()
    }

    /// Highest slider position the user may select.
    pub fn slider_max(&self) -> usize {
        self.date_marks.len().saturating_sub(FORECAST_MARKS + 1)
    }
}
