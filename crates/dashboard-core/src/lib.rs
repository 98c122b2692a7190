//! Shared types for the listings dashboard.
//!
//! Listing records and datasets, the month key, table columns, the city
//! catalog, CLI settings, output formatting and the crate-wide error type.

pub mod catalog;
pub mod columns;
pub mod error;
pub mod formatting;
pub mod models;
pub mod month;
pub mod settings;

pub use error::{DashboardError, Result};
pub use models::{CityDataset, Listing, RawListing};
pub use month::YearMonth;
