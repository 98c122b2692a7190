//! Runtime layer for the listings dashboard.
//!
//! Owns the loaded per-city datasets and answers the dashboard's views and
//! selector lists from them.

pub mod context;
pub mod options;

pub use context::{DashboardContext, MapView};
pub use dashboard_core as core;
pub use dashboard_data as data;
pub use options::SelectOption;
