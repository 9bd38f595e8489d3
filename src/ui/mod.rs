//! Native figure window.

pub mod panels;
pub mod plot;

use anyhow::{anyhow, Result};
use eframe::egui;

use crate::app::FigureApp;
use crate::figure::Figure;
use crate::state::FigureState;

/// Open a window showing `figure` next to the text report; returns when the
/// window is closed.
pub fn show_figure(figure: Figure, report_text: String) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1500.0, 1000.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = figure.title.clone();
    let state = FigureState::new(figure, report_text);
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(FigureApp::new(state)))),
    )
    .map_err(|e| anyhow!("cannot open figure window: {e}"))
}
