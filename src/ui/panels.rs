use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::config::ChartOrientation;
use crate::data::filter::StateSelection;
use crate::state::AppState;

const STAR_STEP: f64 = 0.5;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
///
/// Widgets edit a copy of the current criteria; the copy is handed back to
/// the state, which recomputes only if something changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Logo (centered) ----
    let logo = egui::include_image!("../../assets/logo.png");
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add(
            egui::Image::new(logo)
                .max_width(ui.available_width() * 0.5)
                .max_height(96.0)
                .corner_radius(4.0),
        );
    });
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };
    let n_rows = table.len();

    let mut criteria = state.criteria.clone();
    let (lo, hi) = state.stars_bounds;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- State selector ----
            ui.strong("State");
            egui::ComboBox::from_id_salt("state_filter")
                .selected_text(criteria.state.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut criteria.state, StateSelection::All, "All states");
                    for st in &state.states {
                        ui.selectable_value(
                            &mut criteria.state,
                            StateSelection::Only(st.clone()),
                            st,
                        );
                    }
                });
            ui.separator();

            // ---- Rating range ----
            ui.strong("Rating range");
            ui.add(
                Slider::new(&mut criteria.min_stars, lo..=hi)
                    .step_by(STAR_STEP)
                    .text("min"),
            );
            ui.add(
                Slider::new(&mut criteria.max_stars, lo..=hi)
                    .step_by(STAR_STEP)
                    .text("max"),
            );
            if criteria.min_stars > criteria.max_stars {
                ui.label(RichText::new("min is above max: nothing will match").weak());
            }
            ui.separator();

            // ---- Ranking controls ----
            ui.strong("Top categories");
            ui.add(
                egui::DragValue::new(&mut state.top_n)
                    .range(1..=state.categories.len().max(1)),
            );

            ui.strong("Minimum restaurants per category");
            ui.add(egui::DragValue::new(&mut criteria.min_sample_size).range(0..=n_rows));
            ui.separator();

            ui.strong("Bars");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.orientation, ChartOrientation::Horizontal, "Horizontal");
                ui.radio_value(&mut state.orientation, ChartOrientation::Vertical, "Vertical");
            });
            ui.separator();

            if state.categories.is_empty() {
                ui.label(RichText::new("No 0/1 category columns found.").color(Color32::YELLOW));
            } else {
                ui.label(
                    RichText::new(format!("{} category columns detected", state.categories.len()))
                        .weak(),
                );
            }
        });

    state.set_criteria(criteria);
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
            let can_reload = state.table.as_ref().is_some_and(|t| t.source.is_some());
            if ui.add_enabled(can_reload, egui::Button::new("Reload")).clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            let matched = state.analysis.as_ref().map_or(0, |a| a.matched());
            ui.label(format!(
                "{} restaurants loaded, {} match",
                table.len(),
                matched
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
        .set_title("Open restaurant data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path, false);
    }
}
