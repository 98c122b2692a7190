//! Data layer for the listings dashboard.
//!
//! Reads per-city listing files, normalises rows into datasets, aggregates
//! neighbourhood statistics, runs table queries and builds chart series.

pub mod aggregator;
pub mod query;
pub mod reader;
pub mod store;
pub mod timeseries;

pub use dashboard_core as core;
