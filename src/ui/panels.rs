use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Listings");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Price range ----
            if let Some((lo, hi)) = dataset.price_bounds() {
                ui.strong("Select Price Range (Rs.)");
                let (mut min, mut max) = state.price_draft;
                match range_sliders(ui, &mut min, &mut max, lo.floor(), hi.ceil()) {
                    SliderChange::Released => state.set_price_range(min, max),
                    SliderChange::Dragging => state.drag_price_range(min, max),
                    SliderChange::Idle => {}
                }
                ui.separator();
            }

            // ---- Carpet area range ----
            if let Some((lo, hi)) = dataset.area_bounds() {
                ui.strong("Carpet Area Range (sqft)");
                let (mut min, mut max) = state.area_draft;
                match range_sliders(ui, &mut min, &mut max, lo.floor(), hi.ceil()) {
                    SliderChange::Released => state.set_area_range(min, max),
                    SliderChange::Dragging => state.drag_area_range(min, max),
                    SliderChange::Idle => {}
                }
                ui.separator();
            }

            // ---- Location multiselect ----
            let n_selected = state.constraints.locations.len();
            let header = if n_selected == 0 {
                format!("Location(s)  (all {})", dataset.locations.len())
            } else {
                format!("Location(s)  ({n_selected}/{})", dataset.locations.len())
            };

            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("locations")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if ui.small_button("Clear").clicked() {
                        state.clear_locations();
                    }
                    for location in &dataset.locations {
                        let mut checked = state.constraints.locations.contains(location);
                        if ui.checkbox(&mut checked, location.as_str()).changed() {
                            state.toggle_location(location);
                        }
                    }
                });
        });
}

enum SliderChange {
    Idle,
    /// Moved, but the pointer is still down.
    Dragging,
    /// Drag released, or a click / keyboard / text edit.
    Released,
}

/// A min / max slider pair over `lo..=hi`.
fn range_sliders(ui: &mut Ui, min: &mut f64, max: &mut f64, lo: f64, hi: f64) -> SliderChange {
    let min_resp = ui.add(egui::Slider::new(min, lo..=hi).text("min").integer());
    let max_resp = ui.add(egui::Slider::new(max, lo..=hi).text("max").integer());
    if min_resp.changed() && *min > *max {
        *max = *min;
    }
    if max_resp.changed() && *max < *min {
        *min = *max;
    }

    let released = |r: &egui::Response| r.drag_stopped() || (r.changed() && !r.dragged());
    if released(&min_resp) || released(&max_resp) {
        SliderChange::Released
    } else if min_resp.changed() || max_resp.changed() {
        SliderChange::Dragging
    } else {
        SliderChange::Idle
    }
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
            let can_reload = state.source_path.is_some();
            if ui.add_enabled(can_reload, egui::Button::new("Reload")).clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(path) = &state.source_path {
            ui.separator();
            ui.weak(path.display().to_string());
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
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "txt", "json"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
