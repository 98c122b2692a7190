//! Plain-text rendering of the dashboard views.

use dashboard_core::formatting::{self, MISSING};
use dashboard_data::query::TableView;
use dashboard_data::timeseries::{PriceSeries, Segment, Series, TimeSeriesPoint};
use dashboard_runtime::{DashboardContext, MapView, SelectOption};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A titled, column-aligned text table.
#[derive(Debug, Clone)]
pub struct PlainTable {
    title: Option<String>,
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
    footer: Vec<String>,
}

impl PlainTable {
    /// A table whose first column is left-aligned and the rest right-aligned.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = (0..headers.len())
            .map(|i| if i == 0 { Align::Left } else { Align::Right })
            .collect();
        Self {
            title: None,
            headers,
            align,
            rows: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn push_footer(&mut self, line: impl Into<String>) {
        self.footer.push(line.into());
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(&self.line(&self.headers, &widths));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.line(row, &widths));
            out.push('\n');
        }
        if self.rows.is_empty() {
            out.push_str("(no rows)\n");
        }
        for line in &self.footer {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    fn line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                let pad = " ".repeat(width.saturating_sub(cell.width()));
                match self.align.get(i).copied().unwrap_or(Align::Left) {
                    Align::Left => format!("{}{}", cell, pad),
                    Align::Right => format!("{}{}", pad, cell),
                }
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

pub fn cities(ctx: &DashboardContext) -> PlainTable {
    let mut table = PlainTable::new(["City", "Neighbourhoods", "Listings", "First", "Last"]);
    for option in ctx.city_options() {
        let Some(dataset) = ctx.dataset(&option.value) else { continue };
        let months = dataset.months();
        table.push_row(vec![
            option.label,
            dataset.neighborhoods().len().to_string(),
            formatting::format_number(dataset.len() as f64, 0),
            months.first().map_or_else(|| MISSING.to_string(), |m| m.to_string()),
            months.last().map_or_else(|| MISSING.to_string(), |m| m.to_string()),
        ]);
    }
    table
}

pub fn months(ctx: &DashboardContext) -> PlainTable {
    let mut table = PlainTable::new(["Position", "Month"]).align(0, Align::Right);
    for (i, month) in ctx.date_marks().iter().enumerate() {
        table.push_row(vec![i.to_string(), month.to_string()]);
    }
    table.push_footer(format!("Slider maximum: {}", ctx.slider_max()));
    table
}

pub fn options(title: &str, options: &[SelectOption]) -> PlainTable {
    let mut table = PlainTable::new([title]);
    for option in options {
        table.push_row(vec![option.label.clone()]);
    }
    table
}

pub fn map(view: &MapView<'_>) -> PlainTable {
    let mut table = PlainTable::new(["Neighbourhood", "Avg Price", "Avg Rating", "Avg Reviews", "Listings"])
        .title(format!("{} - {}", view.city, view.month));
    for stat in &view.stats {
        table.push_row(vec![
            stat.neighborhood.clone(),
            formatting::format_price(stat.avg_price),
            formatting::format_optional(stat.avg_rating, 2),
            formatting::format_optional(stat.avg_review_count, 1),
            stat.listing_count.to_string(),
        ]);
    }
    if let Some((low, high)) = view.price_range {
        table.push_footer(format!(
            "Price range: {} - {}",
            formatting::format_price(low),
            formatting::format_price(high)
        ));
    }
    if let Some(viewport) = view.viewport {
        table.push_footer(format!(
            "Map centre: {:.4}, {:.4} (zoom {})",
            viewport.center.lat, viewport.center.lon, viewport.zoom_level
        ));
    }
    table
}

pub fn listings(view: &TableView<'_>) -> PlainTable {
    let mut table = PlainTable::new(view.headers());
    for (i, column) in view.columns.iter().enumerate() {
        if !column.is_numeric() {
            table = table.align(i, Align::Left);
        }
    }
    for row in view.rows() {
        table.push_row(row.iter().map(formatting::format_cell).collect());
    }
    table.push_footer(format!("{} listings", view.len()));
    table
}

pub fn series(title: &str, series: &Series) -> PlainTable {
    match series {
        Series::Price(price) => price_series(title, price),
        Series::Rating { points } => {
            let mut table = PlainTable::new(["Month", "Rating"]).title(title);
            for point in points {
                table.push_row(vec![point.date.to_string(), formatting::format_number(point.value, 2)]);
            }
            table
        }
    }
}

fn price_series(title: &str, series: &PriceSeries) -> PlainTable {
    let mut table = PlainTable::new(["Month", "Price", "Segment", "Lower", "Upper"])
        .title(title)
        .align(2, Align::Left);
    for point in series.points() {
        let band = series.confidence_band.iter().find(|b| b.date == point.date);
        table.push_row(vec![
            point.date.to_string(),
            formatting::format_price(point.value),
            segment_label(point).to_string(),
            formatting::format_optional(band.map(|b| b.lower), 2),
            formatting::format_optional(band.map(|b| b.upper), 2),
        ]);
    }
    if let Some(model) = &series.forecast_model {
        table.push_footer(format!("Forecast model: {}", model));
    }
    table
}

fn segment_label(point: &TimeSeriesPoint) -> &'static str {
    match point.segment {
        Some(Segment::Historical) => "historical",
        Some(Segment::Forecast) => "forecast",
        None => MISSING,
    }
}
