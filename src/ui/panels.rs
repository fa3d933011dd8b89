use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.base.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone the option lists so state can be mutated inside the loops.
    let countries = state.country_options.clone();
    let regions = state.region_options.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Country multiselect ----
            let header = format!(
                "Select Country  ({}/{})",
                state.filters.countries.len(),
                countries.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("countries")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ScrollArea::vertical()
                        .id_salt("country_list")
                        .max_height(260.0)
                        .show(ui, |ui: &mut Ui| {
                            for country in &countries {
                                let mut checked = state.filters.countries.contains(country);
                                if ui.checkbox(&mut checked, country.as_str()).changed() {
                                    state.toggle_country(country);
                                }
                            }
                        });
                });

            // ---- Region multiselect ----
            let header = format!(
                "Select Region  ({}/{})",
                state.filters.regions.len(),
                regions.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("regions")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for region in &regions {
                        let mut text = RichText::new(region.as_str());
                        if let Some(cm) = &state.region_colors {
                            text = text.color(cm.color_for(region));
                        }
                        let mut checked = state.filters.regions.contains(region);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_region(region);
                        }
                    }
                });
            ui.separator();

            // ---- Case bounds ----
            ui.strong("Min Confirmed Cases");
            let mut min_cases = state.filters.min_cases;
            if ui
                .add(egui::DragValue::new(&mut min_cases).speed(100.0))
                .changed()
            {
                state.filters.min_cases = min_cases;
                state.refilter();
            }

            ui.strong("Max Confirmed Cases (0 = no limit)");
            let mut max_cases = state.filters.max_cases.unwrap_or(0);
            if ui
                .add(egui::DragValue::new(&mut max_cases).speed(100.0))
                .changed()
            {
                state.filters.max_cases = Some(max_cases).filter(|&m| m > 0);
                state.refilter();
            }
            ui.separator();

            // ---- Search ----
            ui.strong("Search Country");
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.search_text).hint_text("e.g. land"),
            );
            if response.changed() {
                let text = state.search_text.clone();
                state.set_search(text);
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(base), Some(view)) = (&state.base, &state.view) {
            ui.label(format!(
                "{} countries loaded, {} visible",
                base.len(),
                view.table.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open country statistics")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
