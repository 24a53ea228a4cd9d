use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyBistroApp {
    pub state: AppState,
}

impl RustyBistroApp {
    /// Build the app and open the start-up file, if one is configured.
    pub fn new(config: DashboardConfig) -> Self {
        let startup_file = config.data_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = startup_file {
            log::info!("Opening start-up file {}", path.display());
            state.open_path(&path, false);
        }
        Self { state }
    }
}

impl eframe::App for RustyBistroApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::central_view(ui, &mut self.state);
        });
    }
}
