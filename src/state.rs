use eframe::egui::Color32;

use crate::color::figure_colors;
use crate::figure::Figure;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the figure window shows, independent of rendering.
pub struct FigureState {
    pub figure: Figure,

    /// Per panel, per series colours (computed once).
    pub colors: Vec<Vec<Color32>>,

    /// `(rows, cols)` of the subplot grid.
    pub shape: (usize, usize),

    /// Console report, shown in the side panel.
    pub report_text: String,

    /// Whether the side panel with the text report is open.
    pub show_report: bool,
}

impl FigureState {
    pub fn new(figure: Figure, report_text: String) -> Self {
        let colors = figure_colors(&figure);
        let shape = figure.shape();
        Self {
            figure,
            colors,
            shape,
            report_text,
            show_report: true,
        }
    }

    pub fn toggle_report(&mut self) {
        self.show_report = !self.show_report;
    }

    /// Series colours of panel `idx`.
    pub fn panel_colors(&self, idx: usize) -> &[Color32] {
        self.colors.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::figure::{Panel, Series, SeriesStyle};

    #[test]
    fn test_state_precomputes_layout() {
        let panel = || {
            Panel::new("p", "x", "y").with_series(Series::new("s", SeriesStyle::Scatter, vec![[0.0, 1.0]]))
        };
        let figure = Figure::new("f").with_panel(panel()).with_panel(panel()).with_panel(panel());
        let mut state = FigureState::new(figure, "report".to_string());
        assert_eq!(state.shape, (2, 2));
        assert_eq!(state.panel_colors(2).len(), 1);
        assert!(state.panel_colors(9).is_empty());
        state.toggle_report();
        assert!(!state.show_report);
    }
}
