use std::path::{Path, PathBuf};
use std::sync::Arc;

use covid_dash::data::aggregate::{
    region_summary, severity_breakdown, summary_metrics, top_n, RankedEntry, RegionTotal,
    SeverityShare, SummaryMetrics,
};
use covid_dash::data::cache::TableCache;
use covid_dash::data::columns::{CONFIRMED, COUNTRY, DEATHS, RECOVERED, REGION};
use covid_dash::data::filter::{filter_table, FilterParams};
use covid_dash::data::regression::{fit_linear_regression, RegressionOutcome};
use covid_dash::{DashboardConfig, LoadError, Table};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Derived view of the filtered table
// ---------------------------------------------------------------------------

/// Everything the central panel draws, recomputed on every filter change.
pub struct DashboardView {
    pub table: Table,
    pub metrics: SummaryMetrics,
    pub severity: Vec<SeverityShare>,
    pub top_confirmed: Vec<RankedEntry>,
    pub top_deaths: Vec<RankedEntry>,
    /// `None` when the source has no `recovered` column.
    pub top_recovered: Option<Vec<RankedEntry>>,
    pub regions: Vec<RegionTotal>,
    pub regression: RegressionOutcome,
}

impl DashboardView {
    pub fn build(table: Table, top: usize) -> Self {
        let metrics = summary_metrics(&table);
        Self {
            severity: severity_breakdown(&metrics),
            top_confirmed: top_n(&table, CONFIRMED, top),
            top_deaths: top_n(&table, DEATHS, top),
            top_recovered: table
                .has_column(RECOVERED)
                .then(|| top_n(&table, RECOVERED, top)),
            regions: region_summary(&table),
            regression: fit_linear_regression(&table),
            metrics,
            table,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Source of the current base table.
    pub source: Option<PathBuf>,

    /// Base table, as loaded (None until a load succeeds).
    pub base: Option<Arc<Table>>,

    /// Loaded tables by path.
    pub cache: TableCache,

    /// Sidebar selections.
    pub filters: FilterParams,

    /// Options for the multiselect widgets, taken from the base table.
    pub country_options: Vec<String>,
    pub region_options: Vec<String>,

    /// Search box contents; copied into `filters` on change.
    pub search_text: String,

    /// Result of the last filter pass.
    pub view: Option<DashboardView>,

    /// Region colours, stable across filter changes.
    pub region_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            source: None,
            base: None,
            cache: TableCache::new(),
            filters: FilterParams::default(),
            country_options: Vec::new(),
            region_options: Vec::new(),
            search_text: String::new(),
            view: None,
            region_colors: None,
            status_message: None,
        }
    }

    /// Load (or fetch from cache) a source and make it the base table.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(table) => {
                log::info!("Loaded {} rows from {}", table.len(), path.display());
                self.set_base(path.to_path_buf(), table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(load_error_message(&e));
            }
        }
    }

    /// Drop the cached copy of the current source and read it again.
    pub fn reload(&mut self) {
        if let Some(path) = self.source.clone() {
            self.cache.invalidate(&path);
            self.open(&path);
        }
    }

    fn set_base(&mut self, path: PathBuf, table: Arc<Table>) {
        self.country_options = table.unique_strings(COUNTRY).into_iter().collect();
        let regions = table.unique_strings(REGION);
        self.region_colors = Some(ColorMap::new(&regions));
        self.region_options = regions.into_iter().collect();

        self.filters = FilterParams::default();
        self.search_text.clear();
        self.source = Some(path);
        self.base = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view after a filter change. One synchronous pass:
    /// filter, then aggregates and regression over the result.
    pub fn refilter(&mut self) {
        self.view = self.base.as_ref().map(|base| {
            let filtered = filter_table(base, &self.filters);
            DashboardView::build(filtered, self.config.top_n)
        });
    }

    pub fn set_search(&mut self, text: String) {
        self.filters.search_term = Some(text).filter(|t| !t.is_empty());
        self.refilter();
    }

    /// Toggle membership of `value` in a multiselect set.
    pub fn toggle_country(&mut self, value: &str) {
        toggle(&mut self.filters.countries, value);
        self.refilter();
    }

    pub fn toggle_region(&mut self, value: &str) {
        toggle(&mut self.filters.regions, value);
        self.refilter();
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterParams::default();
        self.search_text.clear();
        self.refilter();
    }
}

fn toggle(set: &mut std::collections::BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

fn load_error_message(e: &LoadError) -> String {
    match e {
        LoadError::SourceNotFound(path) => format!(
            "CSV file not found! Ensure '{}' exists.",
            path.display()
        ),
        other => format!("Error loading data: {other}"),
    }
}
