use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::CityCatalog;
use crate::error::Result;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Neighbourhood price and rating statistics for short-term rental listings
#[derive(Parser, Debug, Clone)]
#[command(
    name = "listings-dashboard",
    about = "Neighbourhood price and rating statistics for short-term rental listings",
    version
)]
pub struct Settings {
    /// Directory holding the `combined/` listing files and `geojson/` boundaries
    #[arg(long, env = "LISTINGS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// JSON city catalog replacing the bundled one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (logs go to stderr when omitted)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// One dashboard view.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the loaded cities
    Cities,

    /// List the months available on the date slider
    Months,

    /// List the neighbourhoods of a city
    Neighborhoods {
        #[arg(long)]
        city: String,
    },

    /// Per-neighbourhood averages for one month (the map view)
    Map {
        #[arg(long)]
        city: String,
        /// Month as YYYY-MM (defaults to the first slider month)
        #[arg(long)]
        month: Option<String>,
    },

    /// Listings of a neighbourhood, sorted and projected (the table view)
    Table {
        #[arg(long)]
        city: String,
        /// Month as YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        /// Column to sort by (defaults to the rating)
        #[arg(long)]
        sort: Option<String>,
        /// Sort direction
        #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
        order: String,
        /// Extra columns to show after the base columns
        #[arg(long = "column", value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Price or rating over time for a neighbourhood (the chart view)
    Series {
        #[arg(long)]
        city: String,
        #[arg(long)]
        neighborhood: String,
        #[arg(long, default_value = "price", value_parser = ["price", "rating"])]
        kind: String,
    },
}

impl Settings {
    /// The data directory: `--data-dir` when given, otherwise `~/webapp/data`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(CityCatalog::default_data_dir)
    }

    /// The catalog named by `--catalog`, or the bundled one.
    pub fn load_catalog(&self) -> Result<CityCatalog> {
        let data_dir = self.resolved_data_dir();
        match &self.catalog {
            Some(path) => CityCatalog::load_from(path, &data_dir),
            None => Ok(CityCatalog::bundled(&data_dir)),
        }
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    pub fn wants_json(&self) -> bool {
        self.format == "json"
    }
}
