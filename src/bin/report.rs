//! Headless run of the dashboard pipeline: load, filter, aggregate, fit, and
//! print the result as JSON.
//!
//! ```text
//! covid-report [PATH] [--country C]... [--region R]... [--min N] [--max N]
//!              [--search TERM] [--top N]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use covid_dash::data::aggregate::{
    region_summary, severity_breakdown, summary_metrics, top_n, RankedEntry, RegionTotal,
    SeverityShare, SummaryMetrics,
};
use covid_dash::data::columns::{CONFIRMED, DEATHS, RECOVERED};
use covid_dash::data::filter::{filter_table, FilterParams};
use covid_dash::data::loader::load_file;
use covid_dash::data::regression::{fit_linear_regression, RegressionOutcome};
use covid_dash::DashboardConfig;

#[derive(Debug, Serialize)]
struct Report {
    source: String,
    filters: FilterParams,
    total_rows: usize,
    filtered_rows: usize,
    metrics: SummaryMetrics,
    severity: Vec<SeverityShare>,
    top_confirmed: Vec<RankedEntry>,
    top_deaths: Vec<RankedEntry>,
    top_recovered: Vec<RankedEntry>,
    regions: Vec<RegionTotal>,
    regression: RegressionOutcome,
}

/// Print the dashboard's figures for a country table as JSON.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Country table (.csv, .json or .parquet); defaults to $COVID_DASH_DATA.
    source: Option<String>,
    /// Keep only this country (repeatable).
    #[arg(long = "country", value_name = "C")]
    countries: Vec<String>,
    /// Keep only this region (repeatable).
    #[arg(long = "region", value_name = "R")]
    regions: Vec<String>,
    /// Minimum confirmed cases; 0 disables the bound.
    #[arg(long, value_name = "N", default_value_t = 0)]
    min: u64,
    /// Maximum confirmed cases; 0 disables the bound.
    #[arg(long, value_name = "N")]
    max: Option<u64>,
    /// Case-insensitive substring of the country name.
    #[arg(long, value_name = "TERM")]
    search: Option<String>,
    /// Length of each ranking; defaults to $COVID_DASH_TOP_N.
    #[arg(long, value_name = "N")]
    top: Option<usize>,
}

impl Args {
    fn filters(&self) -> FilterParams {
        FilterParams {
            countries: self.countries.iter().cloned().collect(),
            regions: self.regions.iter().cloned().collect(),
            min_cases: self.min,
            max_cases: self.max,
            search_term: self.search.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let filters = args.filters();
    let mut config = DashboardConfig::from_env().with_source_arg(args.source);
    if let Some(top) = args.top {
        config.top_n = top;
    }

    let base = load_file(&config.source)
        .with_context(|| format!("loading {}", config.source.display()))?;
    let filtered = filter_table(&base, &filters);
    if filtered.is_empty() {
        log::warn!("No data found for the selected filters.");
    }

    let metrics = summary_metrics(&filtered);
    let report = Report {
        source: config.source.display().to_string(),
        total_rows: base.len(),
        filtered_rows: filtered.len(),
        severity: severity_breakdown(&metrics),
        metrics,
        top_confirmed: top_n(&filtered, CONFIRMED, config.top_n),
        top_deaths: top_n(&filtered, DEATHS, config.top_n),
        top_recovered: top_n(&filtered, RECOVERED, config.top_n),
        regions: region_summary(&filtered),
        regression: fit_linear_regression(&filtered),
        filters,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("covid-report").chain(list.iter().copied()))
    }

    #[test]
    fn parses_source_and_filters() {
        let a = args(&[
            "data.csv", "--region", "Europe", "--region", "Africa", "--min", "100", "--search",
            "ia", "--top", "5",
        ])
        .unwrap();
        assert_eq!(a.source.as_deref(), Some("data.csv"));
        assert_eq!(a.top, Some(5));

        let filters = a.filters();
        assert_eq!(filters.regions.len(), 2);
        assert_eq!(filters.min_cases, 100);
        assert_eq!(filters.max_cases, None);
        assert_eq!(filters.search_term.as_deref(), Some("ia"));
    }

    #[test]
    fn no_arguments_means_no_filters() {
        let a = args(&[]).unwrap();
        assert!(a.source.is_none());
        assert!(!a.filters().is_active());
    }

    #[test]
    fn repeated_countries_collapse_into_a_set() {
        let a = args(&["--country", "Chad", "--country", "Peru", "--country", "Chad"]).unwrap();
        assert_eq!(
            a.filters().countries.into_iter().collect::<Vec<_>>(),
            ["Chad", "Peru"]
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&["--min"]).is_err());
        assert!(args(&["--min", "-3"]).is_err());
        assert!(args(&["--max", "lots"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["a.csv", "b.csv"]).is_err());
    }
}
