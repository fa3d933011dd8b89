//! Data layer: core types, loading, filtering and the derived views.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → normalise schema → derive rates → Table
//!   └──────────┘
//!        │            (memoised per source path by `cache`)
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply FilterParams → reduced Table (view)
//!   └──────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌───────────┐     ┌────────────┐
//!   │ aggregate │     │ regression │  OLS fit of confirmed on deaths
//!   └───────────┘     └────────────┘
//!   KPIs, top-N, region totals
//! ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod regression;

/// Canonical column names the pipeline relies on after load.
pub mod columns {
    pub const COUNTRY: &str = "country";
    pub const REGION: &str = "region";
    pub const CONFIRMED: &str = "confirmed";
    pub const DEATHS: &str = "deaths";
    pub const RECOVERED: &str = "recovered";
    pub const RECOVERY_RATE: &str = "recovery_rate";
    pub const DEATH_RATE: &str = "death_rate";

    /// Placeholder region for sources without a region column.
    pub const UNKNOWN_REGION: &str = "Unknown";
}
