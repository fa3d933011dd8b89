//! Per-country pandemic statistics: loading, filtering, aggregation and
//! regression over a small in-memory table.
//!
//! The dashboard binary (`covid-dash`) and the headless `covid-report` binary
//! are thin shells over the [`data`] pipeline.

pub mod config;
pub mod data;

pub use config::DashboardConfig;
pub use data::error::LoadError;
pub use data::model::{Table, Value};
