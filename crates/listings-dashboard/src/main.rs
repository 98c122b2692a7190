mod bootstrap;
mod render;

use anyhow::{bail, Context, Result};
use clap::Parser;
use dashboard_core::month::YearMonth;
use dashboard_core::settings::{Command, Settings};
use dashboard_data::query::{Query, SortDirection};
use dashboard_data::reader::FileProvider;
use dashboard_data::timeseries::SeriesKind;
use dashboard_runtime::DashboardContext;
use serde::Serialize;

fn main() -> Result<()> {
    let mut settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_deref())?;

    tracing::info!("Listings dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    if settings.data_dir.is_none() {
        settings.data_dir = bootstrap::discover_data_dir();
    }
    let catalog = settings
        .load_catalog()
        .context("failed to load the city catalog")?;
    tracing::info!(
        "Data directory: {}, {} cities in catalog",
        settings.resolved_data_dir().display(),
        catalog.cities.len()
    );

    let provider = FileProvider::new(catalog);
    let ctx = DashboardContext::load(&provider);

    run(&settings, &ctx)
}

fn run(settings: &Settings, ctx: &DashboardContext) -> Result<()> {
    let json = settings.wants_json();

    match &settings.command {
        Command::Cities => {
            if json {
                print_json(&ctx.city_options())
            } else {
                print!("{}", render::cities(ctx).render());
                Ok(())
            }
        }

        Command::Months => {
            if json {
                print_json(&serde_json::json!({
                    "marks": ctx.date_marks(),
                    "slider_max": ctx.slider_max(),
                }))
            } else {
                print!("{}", render::months(ctx).render());
                Ok(())
            }
        }

        Command::Neighborhoods { city } => {
            let options = ctx.neighborhood_options(city);
            if json {
                print_json(&options)
            } else {
                print!("{}", render::options("Neighbourhood", &options).render());
                Ok(())
            }
        }

        Command::Map { city, month } => {
            let month = match month {
                Some(raw) => raw.parse::<YearMonth>()?,
                None => match ctx.month_at(0) {
                    Some(first) => first,
                    None => bail!("no listing data loaded"),
                },
            };
            let view = ctx.map_view(city, month);
            if json {
                print_json(&view)
            } else {
                print!("{}", render::map(&view).render());
                Ok(())
            }
        }

        Command::Table {
            city,
            month,
            neighborhood,
            sort,
            order,
            columns,
        } => {
            let mut query = Query::new(city.as_str()).extra_columns(columns.iter().cloned());
            if let Some(raw) = month {
                query = query.month(raw.parse::<YearMonth>()?);
            }
            if let Some(n) = neighborhood {
                query = query.neighborhood(n.as_str());
            }
            query.sort_direction = order.parse::<SortDirection>()?;
            query.sort_column = sort.clone();

            let table = ctx.query(&query)?;
            if json {
                print_json(&table.records())
            } else {
                print!("{}", render::listings(&table).render());
                Ok(())
            }
        }

        Command::Series {
            city,
            neighborhood,
            kind,
        } => {
            let kind: SeriesKind = kind.parse()?;
            let series = ctx.timeseries(city, neighborhood, kind);
            if json {
                print_json(&series)
            } else {
                print!("{}", render::series(&kind.title(neighborhood), &series).render());
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
