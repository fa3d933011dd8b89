use std::collections::BTreeMap;

use serde::Serialize;

use super::columns::{CONFIRMED, COUNTRY, DEATHS, RECOVERED, REGION};
use super::model::Table;

/// Default length of the top-N rankings.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Summary metrics (KPIs)
// ---------------------------------------------------------------------------

/// Whole-table totals. A metric is 0 when its column is absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
}

impl SummaryMetrics {
    /// Display labels paired with their totals, in dashboard order.
    pub fn labeled(&self) -> [(&'static str, i64); 3] {
        [
            ("Total Confirmed Cases", self.confirmed),
            ("Total Deaths", self.deaths),
            ("Total Recovered", self.recovered),
        ]
    }
}

pub fn summary_metrics(table: &Table) -> SummaryMetrics {
    SummaryMetrics {
        confirmed: column_total(table, CONFIRMED),
        deaths: column_total(table, DEATHS),
        recovered: column_total(table, RECOVERED),
    }
}

/// Integer total of the numeric cells of a column (truncated toward zero).
fn column_total(table: &Table, column: &str) -> i64 {
    table
        .numeric_column(column)
        .map(|vals| vals.into_iter().flatten().sum::<f64>() as i64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Top-N ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub country: String,
    pub value: f64,
}

/// The `n` rows with the largest `column` value, descending.
///
/// Ties keep their original row order. Rows whose value is not a number are
/// not ranked. An absent column gives an empty ranking.
pub fn top_n(table: &Table, column: &str, n: usize) -> Vec<RankedEntry> {
    let Some(values) = table.numeric_column(column) else {
        return Vec::new();
    };
    let country_idx = table.column_index(COUNTRY);

    let mut ranked: Vec<RankedEntry> = table
        .rows()
        .zip(values)
        .filter_map(|(row, value)| {
            let value = value.filter(|v| !v.is_nan())?;
            let country = country_idx.map(|i| row[i].label()).unwrap_or_default();
            Some(RankedEntry { country, value })
        })
        .collect();

    // `sort_by` is stable, which is what keeps ties in row order.
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Region summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionTotal {
    pub region: String,
    pub confirmed: f64,
}

/// Confirmed cases summed per region, largest first (ties by region name).
/// Empty when the table has no `region` column.
pub fn region_summary(table: &Table) -> Vec<RegionTotal> {
    let Some(region_idx) = table.column_index(REGION) else {
        return Vec::new();
    };
    let confirmed_idx = table.column_index(CONFIRMED);

    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for row in table.rows() {
        let confirmed = confirmed_idx
            .and_then(|i| row[i].as_f64())
            .unwrap_or(0.0);
        *groups.entry(row[region_idx].label()).or_default() += confirmed;
    }

    let mut totals: Vec<RegionTotal> = groups
        .into_iter()
        .map(|(region, confirmed)| RegionTotal { region, confirmed })
        .collect();
    totals.sort_by(|a, b| b.confirmed.total_cmp(&a.confirmed));
    totals
}

// ---------------------------------------------------------------------------
// Severity breakdown (pie chart data)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityShare {
    pub label: &'static str,
    pub value: i64,
    /// Percentage of the three-way total.
    pub share: f64,
}

/// Split of confirmed / deaths / recovered as shares of their sum.
pub fn severity_breakdown(metrics: &SummaryMetrics) -> Vec<SeverityShare> {
    let parts = [
        ("Confirmed", metrics.confirmed),
        ("Deaths", metrics.deaths),
        ("Recovered", metrics.recovered),
    ];
    let total: i64 = parts.iter().map(|(_, v)| v).sum();
    parts
        .into_iter()
        .map(|(label, value)| SeverityShare {
            label,
            value,
            share: if total == 0 {
                0.0
            } else {
                value as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn table() -> Table {
        let columns = ["country", "region", "confirmed", "deaths"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let row = |c: &str, r: &str, n: i64, d: i64| {
            vec![Value::from(c), Value::from(r), Value::Integer(n), Value::Integer(d)]
        };
        Table::from_rows(
            columns,
            vec![
                row("A", "X", 100, 10),
                row("B", "Y", 300, 1),
                row("C", "X", 300, 7),
                row("D", "Z", 50, 0),
            ],
        )
    }

    #[test]
    fn float_keys_are_not_rounded() {
        let t = Table::from_rows(
            vec!["country".into(), "region".into(), "confirmed".into()],
            vec![
                vec![Value::Float(1.501), Value::Float(1.501), Value::Integer(5)],
                vec![Value::Float(1.499), Value::Float(1.499), Value::Integer(3)],
            ],
        );
        let regions = region_summary(&t);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region, "1.501");
        assert_eq!(regions[1].region, "1.499");
        assert_eq!(top_n(&t, "confirmed", 2)[1].country, "1.499");
    }

    #[test]
    fn metrics_sum_columns_and_default_to_zero() {
        let m = summary_metrics(&table());
        assert_eq!(
            m,
            SummaryMetrics {
                confirmed: 750,
                deaths: 18,
                recovered: 0
            }
        );
        assert_eq!(m.labeled()[0], ("Total Confirmed Cases", 750));
    }

    #[test]
    fn top_n_breaks_ties_by_row_order() {
        let top = top_n(&table(), "confirmed", 3);
        let names: Vec<_> = top.iter().map(|e| e.country.as_str()).collect();
        assert_eq!(names, ["B", "C", "A"]);
        assert_eq!(top[0].value, 300.0);
    }

    #[test]
    fn top_n_handles_oversized_n_and_missing_columns() {
        assert_eq!(top_n(&table(), "deaths", 100).len(), 4);
        assert_eq!(top_n(&table(), "deaths", 0).len(), 0);
        assert!(top_n(&table(), "recovered", 10).is_empty());
    }

    #[test]
    fn region_summary_orders_by_total() {
        let regions = region_summary(&table());
        let got: Vec<_> = regions
            .iter()
            .map(|r| (r.region.as_str(), r.confirmed))
            .collect();
        assert_eq!(got, [("X", 400.0), ("Y", 300.0), ("Z", 50.0)]);
    }

    #[test]
    fn region_summary_without_region_is_empty() {
        let t = Table::from_rows(vec!["country".into()], vec![vec![Value::from("A")]]);
        assert!(region_summary(&t).is_empty());
    }

    #[test]
    fn severity_shares_sum_to_hundred() {
        let shares = severity_breakdown(&SummaryMetrics {
            confirmed: 60,
            deaths: 10,
            recovered: 30,
        });
        assert_eq!(shares[0].share, 60.0);
        let total: f64 = shares.iter().map(|s| s.share).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!(severity_breakdown(&SummaryMetrics::default())
            .iter()
            .all(|s| s.share == 0.0));
    }
}
