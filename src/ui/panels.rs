use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::DIMENSIONS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one collapsible multi-select per
/// filterable dimension. An empty selection shows everything.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.label(RichText::new("Empty selection = show all").weak().small());
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let schema = table.schema.clone();
    let unique = table.unique_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in DIMENSIONS {
                let Some(column) = dim.column(&schema) else {
                    ui.label(
                        RichText::new(format!("{} (not in dataset)", dim.label()))
                            .weak(),
                    );
                    continue;
                };
                let Some(all_values) = unique.get(column) else {
                    continue;
                };

                let n_selected = state.filters.values(dim).len();
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", dim.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.filters.values(dim).contains(val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
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
        });

        ui.separator();

        if let Some(table) = &state.table {
            let filtered = state
                .dashboard
                .as_ref()
                .map(|d| d.filtered_rows)
                .unwrap_or(0);
            ui.label(format!("{} rows loaded, {} after filters", table.len(), filtered));

            ui.separator();

            if ui.button("Clear filters").clicked() {
                state.clear_filters();
            }
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
        .set_title("Open supply-chain data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match state.cache.load(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} records with columns {:?}",
                    table.len(),
                    table.column_names
                );
                if table.schema.supplier.is_none() {
                    log::warn!("no supplier column found, supplier charts disabled");
                }
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
