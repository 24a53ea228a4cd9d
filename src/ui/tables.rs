use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::RankedEntry;
use crate::data::model::RestaurantRecord;

const ROW_HEIGHT: f32 = 18.0;

/// Tabular listing of a ranked prefix: rank, category, value, sample size.
pub fn ranked_table<V>(
    ui: &mut Ui,
    entries: &[RankedEntry<V>],
    value_header: &str,
    format_value: impl Fn(&RankedEntry<V>) -> String,
) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(32.0))
        .column(Column::auto().at_least(160.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Category");
            });
            header.col(|ui| {
                ui.strong(value_header);
            });
            header.col(|ui| {
                ui.strong("Restaurants");
            });
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, entries.len(), |mut row| {
                let idx = row.index();
                let entry = &entries[idx];
                row.col(|ui| {
                    ui.label((idx + 1).to_string());
                });
                row.col(|ui| {
                    ui.label(&entry.category);
                });
                row.col(|ui| {
                    ui.label(format_value(entry));
                });
                row.col(|ui| {
                    ui.label(entry.samples.to_string());
                });
            });
        });
}

/// Listing of the restaurants that pass the current filters.
pub fn restaurant_table(ui: &mut Ui, records: &[RestaurantRecord]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(160.0).clip(true))
        .column(Column::auto().at_least(160.0).clip(true))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::remainder().clip(true))
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for title in [
                "Name",
                "Address",
                "City",
                "State",
                "Stars",
                "Reviews",
                "Open",
                "Location",
                "Categories",
            ] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let rec = &records[row.index()];
                row.col(|ui| {
                    ui.label(&rec.name);
                });
                row.col(|ui| {
                    ui.label(&rec.address);
                });
                row.col(|ui| {
                    ui.label(&rec.city);
                });
                row.col(|ui| {
                    ui.label(&rec.state);
                });
                row.col(|ui| {
                    ui.label(optional(rec.stars.map(|s| format!("{s:.1}"))));
                });
                row.col(|ui| {
                    ui.label(optional(rec.review_count.map(|c| c.to_string())));
                });
                row.col(|ui| {
                    ui.label(match rec.is_open {
                        Some(true) => "yes",
                        Some(false) => "no",
                        None => "–",
                    });
                });
                row.col(|ui| {
                    ui.label(match (rec.latitude, rec.longitude) {
                        (Some(lat), Some(lon)) => format!("{lat:.4}, {lon:.4}"),
                        _ => "–".to_string(),
                    });
                });
                row.col(|ui| {
                    ui.label(rec.categories.join(", "));
                });
            });
        });
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "–".to_string())
}
