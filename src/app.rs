use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashApp {
    pub state: AppState,
}

impl SalesDashApp {
    /// Start with the bundled sample data when present; a missing fallback
    /// is surfaced as a blocking message, not a crash.
    pub fn new() -> Self {
        let mut state = AppState::default();
        match crate::data::loader::load_default() {
            Ok(dataset) => {
                log::info!("Loaded bundled sample data ({} records)", dataset.len());
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::warn!("No default dataset: {e}");
                state.status_message = Some(format!("{e} — open a CSV via File → Open…"));
            }
        }
        Self { state }
    }
}

impl Default for SalesDashApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for SalesDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + analysis tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(view) = &self.state.view else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a CSV file to explore sales data  (File → Open…)");
                });
                return;
            };

            let summary = view.summary;
            panels::metric_row(ui, &summary);
            ui.separator();

            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.state.tab, tab, tab.label());
                }
            });
            ui.separator();

            match self.state.tab {
                Tab::TimeSeries => {
                    panels::rolling_controls(ui, &mut self.state);
                    plot::time_series_plot(ui, &self.state);
                }
                Tab::Categories => plot::category_plot(ui, &self.state),
                Tab::Regions => {
                    panels::region_table(ui, &self.state);
                    ui.separator();
                    plot::region_scatter(ui, &self.state);
                }
                Tab::Details => panels::details_panel(ui, &self.state),
            }
        });
    }
}
