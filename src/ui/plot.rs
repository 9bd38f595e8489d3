use eframe::egui::{self, Color32, Ui, Vec2};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints, PlotUi, Points};

use crate::figure::{Panel, Series, SeriesStyle};
use crate::state::FigureState;

const GRID_SPACING: f32 = 12.0;
const TITLE_HEIGHT: f32 = 22.0;
const ANNOTATION_LINE_HEIGHT: f32 = 15.0;
const MIN_PLOT_HEIGHT: f32 = 80.0;

// ---------------------------------------------------------------------------
// Figure grid (central panel)
// ---------------------------------------------------------------------------

/// Render every panel of the figure in a `rows × cols` grid that fills the
/// available space.
pub fn figure_grid(ui: &mut Ui, state: &FigureState) {
    let (rows, cols) = state.shape;
    if rows == 0 || cols == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to plot");
        });
        return;
    }

    let available = ui.available_size();
    let cell = Vec2::new(
        (available.x - GRID_SPACING * (cols - 1) as f32) / cols as f32,
        (available.y - GRID_SPACING * (rows - 1) as f32) / rows as f32,
    );

    egui::Grid::new("figure_grid")
        .num_columns(cols)
        .spacing([GRID_SPACING, GRID_SPACING])
        .show(ui, |ui: &mut Ui| {
            for (idx, panel) in state.figure.panels.iter().enumerate() {
                ui.vertical(|ui: &mut Ui| {
                    panel_plot(ui, idx, panel, state.panel_colors(idx), cell);
                });
                if (idx + 1) % cols == 0 {
                    ui.end_row();
                }
            }
        });
}

// ---------------------------------------------------------------------------
// One subplot
// ---------------------------------------------------------------------------

/// Title, optional annotation, then the plot itself, all within `size`.
pub fn panel_plot(ui: &mut Ui, idx: usize, panel: &Panel, colors: &[Color32], size: Vec2) {
    ui.set_width(size.x);
    ui.strong(&panel.title);

    let mut header = TITLE_HEIGHT;
    if let Some(text) = &panel.annotation {
        ui.monospace(text);
        header += ANNOTATION_LINE_HEIGHT * text.lines().count() as f32;
    }
    let plot_height = (size.y - header).max(MIN_PLOT_HEIGHT);

    Plot::new(("panel", idx))
        .width(size.x)
        .height(plot_height)
        .legend(Legend::default())
        .x_axis_label(panel.x_label.as_str())
        .y_axis_label(panel.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (i, series) in panel.series.iter().enumerate() {
                let color = colors.get(i).copied().unwrap_or(Color32::LIGHT_BLUE);
                draw_series(plot_ui, series, color);
            }
        });
}

fn draw_series(plot_ui: &mut PlotUi, series: &Series, color: Color32) {
    let points = || PlotPoints::from(series.points.clone());
    match series.style {
        SeriesStyle::Scatter => {
            plot_ui.points(Points::new(points()).name(&series.name).color(color).radius(3.0));
        }
        SeriesStyle::Line => {
            plot_ui.line(Line::new(points()).name(&series.name).color(color).width(1.5));
        }
        SeriesStyle::DashedLine => {
            plot_ui.line(
                Line::new(points())
                    .name(&series.name)
                    .color(color)
                    .width(1.5)
                    .style(LineStyle::dashed_loose()),
            );
        }
        SeriesStyle::LinePoints => {
            plot_ui.line(Line::new(points()).name(&series.name).color(color).width(1.5));
            // Same name so the legend toggles line and markers together.
            plot_ui.points(Points::new(points()).name(&series.name).color(color).radius(3.0));
        }
    }
}
