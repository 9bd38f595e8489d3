use eframe::egui;

use crate::state::FigureState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FigureApp {
    pub state: FigureState,
}

impl FigureApp {
    pub fn new(state: FigureState) -> Self {
        Self { state }
    }
}

impl eframe::App for FigureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Right side panel: text report ----
        if self.state.show_report {
            egui::SidePanel::right("report_panel")
                .default_width(360.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::report_panel(ui, &self.state);
                });
        }

        // ---- Central panel: subplot grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_grid(ui, &self.state);
        });
    }
}
