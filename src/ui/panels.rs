use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::FigureState;

// ---------------------------------------------------------------------------
// Right side panel – text report
// ---------------------------------------------------------------------------

/// Render the console report next to the plots.
pub fn report_panel(ui: &mut Ui, state: &FigureState) {
    ui.heading("Report");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(&state.report_text).monospace());
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the report toggle.
pub fn top_bar(ui: &mut Ui, state: &mut FigureState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong(&state.figure.title);

        ui.separator();

        let (rows, cols) = state.shape;
        ui.label(format!(
            "{} panel(s), {rows}×{cols} grid",
            state.figure.panels.len()
        ));

        ui.separator();

        if ui.selectable_label(state.show_report, "Report").clicked() {
            state.toggle_report();
        }
    });
}
