use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HouseDashApp {
    pub state: AppState,
}

impl HouseDashApp {
    /// Create the app, opening the configured listings file if there is one.
    pub fn new(config: DashboardConfig) -> Self {
        let path = config.data_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = path {
            state.open_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for HouseDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            charts::dashboard(ui, &self.state);
        });
    }
}
