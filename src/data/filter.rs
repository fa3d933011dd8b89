use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::columns::{CONFIRMED, COUNTRY, REGION};
use super::model::{Table, Value};

// ---------------------------------------------------------------------------
// Filter predicate: the sidebar selections
// ---------------------------------------------------------------------------

/// User-chosen predicates, combined with logical AND.
///
/// Every predicate is optional and inactive in its "empty" state: an empty
/// set, a zero bound or a blank search term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterParams {
    /// Keep rows whose `country` is one of these (exact match).
    pub countries: BTreeSet<String>,
    /// Keep rows whose `region` is one of these (exact match).
    pub regions: BTreeSet<String>,
    /// Lower bound on `confirmed`; 0 means no bound.
    pub min_cases: u64,
    /// Upper bound on `confirmed`; `None` or 0 means no bound.
    pub max_cases: Option<u64>,
    /// Case-insensitive substring of `country`.
    pub search_term: Option<String>,
}

impl FilterParams {
    /// Whether any predicate would remove rows.
    pub fn is_active(&self) -> bool {
        !self.countries.is_empty()
            || !self.regions.is_empty()
            || self.min_cases > 0
            || self.active_max().is_some()
            || self.active_search().is_some()
    }

    fn active_max(&self) -> Option<u64> {
        self.max_cases.filter(|&m| m > 0)
    }

    /// The lowercased search term, when one is set.
    fn active_search(&self) -> Option<String> {
        self.search_term
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Return a new table holding the rows of `table` that pass `params`.
/// Row order and columns are preserved.
pub fn filter_table(table: &Table, params: &FilterParams) -> Table {
    if !params.is_active() {
        return table.clone();
    }
    let kept = filtered_indices(table, params);
    log::debug!("filter kept {} of {} rows", kept.len(), table.len());
    table.select_rows(&kept)
}

/// Return indices of rows that pass all active predicates.
///
/// A row fails a numeric bound when its `confirmed` cell is absent or not a
/// number, and fails the country/search predicates when `country` is not a
/// string.
pub fn filtered_indices(table: &Table, params: &FilterParams) -> Vec<usize> {
    let country_idx = table.column_index(COUNTRY);
    let region_idx = table.column_index(REGION);
    let confirmed_idx = table.column_index(CONFIRMED);
    let max_cases = params.active_max();
    let search = params.active_search();

    table
        .rows()
        .enumerate()
        .filter(|(_, row)| {
            if !params.countries.is_empty() {
                match cell_str(row, country_idx) {
                    Some(c) if params.countries.contains(c) => {}
                    _ => return false,
                }
            }

            if !params.regions.is_empty() {
                if let Some(i) = region_idx {
                    match row[i].as_str() {
                        Some(r) if params.regions.contains(r) => {}
                        _ => return false,
                    }
                }
            }

            if params.min_cases > 0 {
                match confirmed_idx.and_then(|i| row[i].as_f64()) {
                    Some(c) if c >= params.min_cases as f64 => {}
                    _ => return false,
                }
            }

            if let Some(max) = max_cases {
                match confirmed_idx.and_then(|i| row[i].as_f64()) {
                    Some(c) if c <= max as f64 => {}
                    _ => return false,
                }
            }

            if let Some(term) = &search {
                match cell_str(row, country_idx) {
                    Some(c) if c.to_lowercase().contains(term.as_str()) => {}
                    _ => return false,
                }
            }

            true
        })
        .map(|(i, _)| i)
        .collect()
}

fn cell_str(row: &[Value], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row[i].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let columns = ["country", "region", "confirmed"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let row = |c: &str, r: &str, n: i64| vec![Value::from(c), Value::from(r), Value::Integer(n)];
        Table::from_rows(
            columns,
            vec![
                row("Canada", "Americas", 120),
                row("Brazil", "Americas", 900),
                row("Japan", "Western Pacific", 300),
                vec![Value::Integer(0), Value::from("Europe"), Value::Integer(50)],
            ],
        )
    }

    fn countries(t: &Table) -> Vec<String> {
        t.rows().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn inactive_filter_returns_input() {
        let t = table();
        assert!(!FilterParams::default().is_active());
        assert_eq!(filter_table(&t, &FilterParams::default()), t);
    }

    #[test]
    fn search_is_case_insensitive_and_skips_non_strings() {
        let params = FilterParams {
            search_term: Some("A".into()),
            ..Default::default()
        };
        assert_eq!(countries(&filter_table(&table(), &params)), ["Canada", "Brazil", "Japan"]);

        let params = FilterParams {
            search_term: Some("an".into()),
            ..Default::default()
        };
        assert_eq!(countries(&filter_table(&table(), &params)), ["Canada", "Japan"]);
    }

    #[test]
    fn country_and_search_read_the_same_cell() {
        let params = FilterParams {
            countries: ["Canada".to_string(), "Japan".to_string()].into(),
            search_term: Some("JAP".into()),
            ..Default::default()
        };
        let kept = filtered_indices(&table(), &params);
        assert_eq!(kept, [2]);
    }

    #[test]
    fn zero_bounds_are_inactive() {
        let params = FilterParams {
            min_cases: 0,
            max_cases: Some(0),
            ..Default::default()
        };
        assert!(!params.is_active());
        assert_eq!(filter_table(&table(), &params).len(), 4);
    }

    #[test]
    fn bounds_are_inclusive() {
        let params = FilterParams {
            min_cases: 120,
            max_cases: Some(300),
            ..Default::default()
        };
        assert_eq!(countries(&filter_table(&table(), &params)), ["Canada", "Japan"]);
    }

    #[test]
    fn predicates_are_anded() {
        let params = FilterParams {
            regions: ["Americas".to_string()].into(),
            min_cases: 200,
            ..Default::default()
        };
        assert_eq!(countries(&filter_table(&table(), &params)), ["Brazil"]);
    }

    #[test]
    fn country_membership_is_exact() {
        let params = FilterParams {
            countries: ["japan".to_string(), "Canada".to_string()].into(),
            ..Default::default()
        };
        assert_eq!(countries(&filter_table(&table(), &params)), ["Canada"]);
    }

    #[test]
    fn everything_excluded_gives_empty_table_with_columns() {
        let params = FilterParams {
            min_cases: 10_000,
            ..Default::default()
        };
        let out = filter_table(&table(), &params);
        assert!(out.is_empty());
        assert_eq!(out.columns(), table().columns());
    }

    #[test]
    fn missing_confirmed_column_excludes_on_bounds() {
        let t = Table::from_rows(vec!["country".into()], vec![vec![Value::from("A")]]);
        let params = FilterParams {
            min_cases: 1,
            ..Default::default()
        };
        assert!(filter_table(&t, &params).is_empty());
    }
}
