use std::ops::RangeInclusive;

use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Plot};

use crate::color::CategoryColors;
use crate::config::ChartOrientation;
use crate::data::aggregate::RankedEntry;
use crate::data::analysis::{matching_records, Analysis, RatingOutcome};
use crate::state::{AppState, Tab};
use crate::ui::tables;

/// Share of the view height given to the chart; the table gets the rest.
const CHART_HEIGHT_FRACTION: f32 = 0.6;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the tab strip and the active view.
pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a restaurant file to begin  (File → Open…)");
        });
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Frequency, "Category frequency");
        ui.selectable_value(&mut state.tab, Tab::Ratings, "Average rating");
        ui.selectable_value(&mut state.tab, Tab::Restaurants, "Restaurants");
    });
    ui.separator();

    let Some(analysis) = &state.analysis else {
        // An engine error; the top bar shows the message.
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Nothing to show for this dataset.");
        });
        return;
    };

    let Analysis::Summary {
        rows,
        frequency,
        ratings,
    } = analysis
    else {
        info_message(ui, "No data matches the current filters.");
        return;
    };

    let colors = state.colors.as_ref();
    match state.tab {
        Tab::Frequency => {
            let top = frequency.top(state.top_n);
            ranked_bar_chart(
                ui,
                "frequency_chart",
                top,
                |e| e.value as f64,
                "Restaurants",
                colors,
                state.orientation,
            );
            tables::ranked_table(ui, top, "Restaurants", |e| e.value.to_string());
        }
        Tab::Ratings => match ratings {
            RatingOutcome::NoQualifyingCategories => info_message(
                ui,
                &format!(
                    "No category has at least {} restaurants in the current selection.",
                    state.criteria.min_sample_size
                ),
            ),
            RatingOutcome::Ranked(series) => {
                let top = series.top(state.top_n);
                ranked_bar_chart(
                    ui,
                    "rating_chart",
                    top,
                    |e| e.value,
                    "Average stars",
                    colors,
                    state.orientation,
                );
                tables::ranked_table(ui, top, "Average stars", |e| format!("{:.2}", e.value));
            }
        },
        Tab::Restaurants => {
            if let Some(table) = &state.table {
                let records = matching_records(table, rows, &state.categories);
                tables::restaurant_table(ui, &records);
            }
        }
    }
}

fn info_message(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(text).italics());
    });
}

// ---------------------------------------------------------------------------
// Ranked bar chart
// ---------------------------------------------------------------------------

/// Bar chart of a ranked prefix. The first entry sits at the top
/// (horizontal) or on the left (vertical).
pub fn ranked_bar_chart<V>(
    ui: &mut Ui,
    id: &str,
    entries: &[RankedEntry<V>],
    value_of: impl Fn(&RankedEntry<V>) -> f64,
    value_label: &str,
    colors: Option<&CategoryColors>,
    orientation: ChartOrientation,
) {
    let n = entries.len();
    let horizontal = orientation == ChartOrientation::Horizontal;

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut bar = Bar::new(bar_position(i, n, horizontal), value_of(e))
                .name(&e.category)
                .width(0.7);
            if let Some(colors) = colors {
                bar = bar.fill(colors.color_for(&e.category));
            }
            bar
        })
        .collect();

    let mut chart = BarChart::new(bars).name(value_label);
    if horizontal {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = entries.iter().map(|e| e.category.clone()).collect();
    let category_axis = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        category_label(&labels, mark.value, horizontal)
    };

    let plot = Plot::new(id)
        .height(ui.available_height() * CHART_HEIGHT_FRACTION)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show_grid(false);
    let plot = if horizontal {
        plot.include_x(0.0)
            .x_axis_label(value_label)
            .y_axis_formatter(category_axis)
    } else {
        plot.include_y(0.0)
            .y_axis_label(value_label)
            .x_axis_formatter(category_axis)
    };

    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Axis position of the `rank`-th of `n` bars.
fn bar_position(rank: usize, n: usize, horizontal: bool) -> f64 {
    if horizontal {
        (n - 1 - rank) as f64
    } else {
        rank as f64
    }
}

/// Category name for a grid mark, or empty between bars.
fn category_label(labels: &[String], mark: f64, horizontal: bool) -> String {
    if mark < 0.0 || mark.fract() != 0.0 {
        return String::new();
    }
    let pos = mark as usize;
    let n = labels.len();
    if pos >= n {
        return String::new();
    }
    let rank = if horizontal { n - 1 - pos } else { pos };
    labels[rank].clone()
}
