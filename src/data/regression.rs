use std::fmt;

use serde::Serialize;

use super::columns::{CONFIRMED, DEATHS};
use super::model::Table;

/// Fewest qualifying rows a line can be fitted through.
pub const MIN_POINTS: usize = 2;

/// Result of [`fit_linear_regression`]. Not having enough data is an expected
/// outcome, so it is a variant rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RegressionOutcome {
    Fitted(LinearFit),
    InsufficientData { reason: InsufficientReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientReason {
    /// Fewer than [`MIN_POINTS`] rows with both `deaths > 0` and `confirmed > 0`.
    TooFewRows { found: usize },
    /// Every qualifying row has the same death count, so the slope is undefined.
    ConstantPredictor,
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientReason::TooFewRows { found } => write!(
                f,
                "Insufficient data points ({found}, need at least {MIN_POINTS}) with non-zero cases/deaths for regression analysis based on current filters."
            ),
            InsufficientReason::ConstantPredictor => write!(
                f,
                "All rows share the same death count; a regression line is undefined."
            ),
        }
    }
}

/// Ordinary-least-squares line `confirmed = slope * deaths + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// `(deaths, confirmed)` of every qualifying row, in row order.
    pub points: Vec<[f64; 2]>,
    /// Fitted `confirmed` for each entry of `points`.
    pub predictions: Vec<f64>,
    /// Coefficient of determination.
    pub r2: f64,
    /// Root mean squared residual.
    pub rmse: f64,
}

impl LinearFit {
    pub fn predict(&self, deaths: f64) -> f64 {
        self.slope * deaths + self.intercept
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl fmt::Display for LinearFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Confirmed = {:.4} × Deaths + {:.2}",
            self.slope, self.intercept
        )
    }
}

/// Fit `confirmed` against `deaths` over rows where both are positive.
pub fn fit_linear_regression(table: &Table) -> RegressionOutcome {
    let points = qualifying_points(table);
    if points.len() < MIN_POINTS {
        log::debug!("regression skipped: {} qualifying rows", points.len());
        return RegressionOutcome::InsufficientData {
            reason: InsufficientReason::TooFewRows {
                found: points.len(),
            },
        };
    }

    if points.iter().all(|p| p[0] == points[0][0]) {
        return RegressionOutcome::InsufficientData {
            reason: InsufficientReason::ConstantPredictor,
        };
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
        let dx = p[0] - mean_x;
        (sxy + dx * (p[1] - mean_y), sxx + dx * dx)
    });

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let predictions: Vec<f64> = points.iter().map(|p| slope * p[0] + intercept).collect();

    let ss_res: f64 = points
        .iter()
        .zip(&predictions)
        .map(|(p, yhat)| (p[1] - yhat).powi(2))
        .sum();
    let ss_tot: f64 = points.iter().map(|p| (p[1] - mean_y).powi(2)).sum();

    let r2 = if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };
    let rmse = (ss_res / n).sqrt();

    log::debug!(
        "regression over {} rows: slope={slope:.4} intercept={intercept:.4} r2={r2:.4}",
        points.len()
    );
    RegressionOutcome::Fitted(LinearFit {
        slope,
        intercept,
        points,
        predictions,
        r2,
        rmse,
    })
}

fn qualifying_points(table: &Table) -> Vec<[f64; 2]> {
    let (Some(deaths), Some(confirmed)) =
        (table.numeric_column(DEATHS), table.numeric_column(CONFIRMED))
    else {
        return Vec::new();
    };
    deaths
        .into_iter()
        .zip(confirmed)
        .filter_map(|(d, c)| match (d, c) {
            (Some(d), Some(c)) if d > 0.0 && c > 0.0 => Some([d, c]),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn table(rows: &[(i64, i64)]) -> Table {
        Table::from_rows(
            vec!["country".into(), "deaths".into(), "confirmed".into()],
            rows.iter()
                .enumerate()
                .map(|(i, &(d, c))| {
                    vec![
                        Value::String(format!("C{i}")),
                        Value::Integer(d),
                        Value::Integer(c),
                    ]
                })
                .collect(),
        )
    }

    fn fitted(outcome: RegressionOutcome) -> LinearFit {
        match outcome {
            RegressionOutcome::Fitted(fit) => fit,
            other => panic!("expected a fit, got {other:?}"),
        }
    }

    #[test]
    fn exact_line_is_recovered() {
        let rows: Vec<_> = (1..=5).map(|d| (d, 2 * d + 5)).collect();
        let fit = fitted(fit_linear_regression(&table(&rows)));
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 5.0).abs() < 1e-9);
        assert!((fit.r2 - 1.0).abs() < 1e-9);
        assert!(fit.rmse.abs() < 1e-9);
        assert_eq!(fit.len(), 5);
        assert!((fit.predict(10.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rows_do_not_qualify() {
        let outcome = fit_linear_regression(&table(&[(0, 10), (3, 0), (2, 9)]));
        assert_eq!(
            outcome,
            RegressionOutcome::InsufficientData {
                reason: InsufficientReason::TooFewRows { found: 1 }
            }
        );
    }

    #[test]
    fn constant_deaths_is_flagged() {
        let outcome = fit_linear_regression(&table(&[(4, 10), (4, 20), (4, 30)]));
        assert_eq!(
            outcome,
            RegressionOutcome::InsufficientData {
                reason: InsufficientReason::ConstantPredictor
            }
        );
    }

    #[test]
    fn constant_fractional_deaths_is_flagged() {
        let t = Table::from_rows(
            vec!["country".into(), "deaths".into(), "confirmed".into()],
            [10, 20, 30]
                .iter()
                .map(|&c| vec![Value::from("X"), Value::Float(0.1), Value::Integer(c)])
                .collect(),
        );
        assert_eq!(
            fit_linear_regression(&t),
            RegressionOutcome::InsufficientData {
                reason: InsufficientReason::ConstantPredictor
            }
        );
    }

    #[test]
    fn noisy_fit_has_partial_r2() {
        let fit = fitted(fit_linear_regression(&table(&[(1, 10), (2, 30), (3, 20), (4, 50)])));
        assert!(fit.r2 > 0.0 && fit.r2 < 1.0);
        assert!(fit.rmse > 0.0);
        assert_eq!(fit.predictions.len(), 4);
    }

    #[test]
    fn missing_columns_are_insufficient() {
        let t = Table::from_rows(vec!["country".into()], vec![vec![Value::from("A")]]);
        assert!(matches!(
            fit_linear_regression(&t),
            RegressionOutcome::InsufficientData { .. }
        ));
    }
}
