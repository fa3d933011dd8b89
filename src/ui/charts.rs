use covid_dash::data::aggregate::RankedEntry;
use covid_dash::data::regression::RegressionOutcome;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::state::{AppState, DashboardView};

const CONFIRMED_COLOR: Color32 = Color32::from_rgb(70, 130, 230);
const DEATHS_COLOR: Color32 = Color32::from_rgb(220, 60, 60);
const RECOVERED_COLOR: Color32 = Color32::from_rgb(60, 180, 110);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, charts and the filtered table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let view = match &state.view {
        Some(view) => view,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view statistics  (File → Open…)");
            });
            return;
        }
    };

    if view.table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new("No data found for the selected filters.")
                    .color(Color32::YELLOW)
                    .heading(),
            );
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Global COVID-19 Dashboard");
            ui.add_space(8.0);

            kpi_row(ui, view);
            ui.separator();

            ui.columns(3, |cols| {
                ranking_chart(
                    &mut cols[0],
                    "Top Countries by Confirmed Cases",
                    &view.top_confirmed,
                    CONFIRMED_COLOR,
                );
                ranking_chart(
                    &mut cols[1],
                    "Top Countries by Deaths",
                    &view.top_deaths,
                    DEATHS_COLOR,
                );
                match &view.top_recovered {
                    Some(top) => ranking_chart(
                        &mut cols[2],
                        "Top Countries by Recoveries",
                        top,
                        RECOVERED_COLOR,
                    ),
                    None => {
                        cols[2].label("No recovered column in this source.");
                    }
                }
            });
            ui.separator();

            regression_section(ui, &view.regression);
            ui.separator();

            ui.columns(2, |cols| {
                severity_section(&mut cols[0], view);
                region_section(&mut cols[1], view, state);
            });
            ui.separator();

            data_table(ui, view);
        });
}

fn kpi_row(ui: &mut Ui, view: &DashboardView) {
    ui.columns(3, |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(view.metrics.labeled()) {
            col.vertical_centered(|ui: &mut Ui| {
                ui.label(label);
                ui.heading(RichText::new(format_count(value)).strong());
            });
        }
    });
}

/// `1234567` → `"1,234,567"`.
fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn ranking_chart(ui: &mut Ui, title: &str, entries: &[RankedEntry], color: Color32) {
    ui.strong(title);
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| Bar::new(i as f64, e.value).name(&e.country).fill(color))
        .collect();

    Plot::new(title)
        .height(200.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color).width(0.7));
        });

    // The plot only labels bars on hover; list them underneath too.
    egui::Grid::new((title, "legend"))
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (i, e) in entries.iter().enumerate() {
                ui.label(format!("{}. {}", i + 1, e.country));
                ui.label(format_count(e.value as i64));
                ui.end_row();
            }
        });
}

fn regression_section(ui: &mut Ui, outcome: &RegressionOutcome) {
    ui.strong("Linear Regression: Confirmed Cases vs. Deaths");

    let fit = match outcome {
        RegressionOutcome::Fitted(fit) => fit,
        RegressionOutcome::InsufficientData { reason } => {
            ui.label(RichText::new(reason.to_string()).color(Color32::LIGHT_BLUE));
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(fit.to_string()).monospace());
        ui.separator();
        ui.label(format!("R² = {:.4}", fit.r2));
        ui.separator();
        ui.label(format!("RMSE = {}", format_count(fit.rmse.round() as i64)));
    });

    let (min_x, max_x) = fit
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[0]), hi.max(p[0]))
        });
    let scatter: PlotPoints = fit.points.iter().copied().collect();
    let line: PlotPoints = [min_x, max_x]
        .into_iter()
        .map(|x| [x, fit.predict(x)])
        .collect();

    Plot::new("regression_plot")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label("Deaths")
        .y_axis_label("Confirmed")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(scatter)
                    .name("Actual Data")
                    .color(Color32::from_rgb(65, 105, 225))
                    .radius(3.0),
            );
            plot_ui.line(
                Line::new(line)
                    .name("Regression Line")
                    .color(Color32::from_rgb(220, 20, 60))
                    .width(2.5),
            );
        });
}

fn severity_section(ui: &mut Ui, view: &DashboardView) {
    ui.strong("Case Severity Breakdown");
    let colors = [CONFIRMED_COLOR, DEATHS_COLOR, RECOVERED_COLOR];
    for (share, color) in view.severity.iter().zip(colors) {
        ui.add(
            egui::ProgressBar::new((share.share / 100.0) as f32)
                .fill(color)
                .text(format!(
                    "{}: {} ({:.1}%)",
                    share.label,
                    format_count(share.value),
                    share.share
                )),
        );
    }
}

fn region_section(ui: &mut Ui, view: &DashboardView, state: &AppState) {
    ui.strong("Confirmed Cases by Region");
    let bars: Vec<Bar> = view
        .regions
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let color = state
                .region_colors
                .as_ref()
                .map_or(Color32::GRAY, |cm| cm.color_for(&r.region));
            Bar::new(i as f64, r.confirmed).name(&r.region).fill(color)
        })
        .collect();

    Plot::new("region_plot")
        .height(200.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_x(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });
}

// ---------------------------------------------------------------------------
// Filtered table
// ---------------------------------------------------------------------------

fn data_table(ui: &mut Ui, view: &DashboardView) {
    let table = &view.table;
    let header = RichText::new(format!("Filtered data ({} rows)", table.len())).strong();
    egui::CollapsingHeader::new(header)
        .id_salt("data_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(60.0), table.columns().len())
                .max_scroll_height(320.0)
                .header(20.0, |mut header| {
                    for name in table.columns() {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let Some(cells) = table.row(row.index()) else {
                            return;
                        };
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell.to_string());
                            });
                        }
                    });
                });
        });
}

#[cfg(test)]
mod tests {
    use super::format_count;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(-1234567), "-1,234,567");
    }
}
