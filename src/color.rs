use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::figure::{Figure, Panel, SeriesStyle};

/// Colour of fitted lines and reference lines.
pub const FIT_COLOR: Color32 = Color32::from_rgb(214, 39, 40);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// starting from blue so a single data series looks like the usual default.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.70, 0.50);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series → colour assignment
// ---------------------------------------------------------------------------

/// Colours for every series of one panel.
///
/// Measured data (scatter / line-with-points) takes palette colours in order;
/// dashed and plain lines are fits or references and share [`FIT_COLOR`].
pub fn panel_colors(panel: &Panel) -> Vec<Color32> {
    let is_data = |style: SeriesStyle| matches!(style, SeriesStyle::Scatter | SeriesStyle::LinePoints);
    let n_data = panel.series.iter().filter(|s| is_data(s.style)).count();
    let mut palette = generate_palette(n_data).into_iter();
    panel
        .series
        .iter()
        .map(|s| {
            if is_data(s.style) {
                palette.next().unwrap_or(Color32::LIGHT_BLUE)
            } else {
                FIT_COLOR
            }
        })
        .collect()
}

/// Colours for every panel of a figure.
pub fn figure_colors(figure: &Figure) -> Vec<Vec<Color32>> {
    figure.panels.iter().map(panel_colors).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::figure::Series;

    #[test]
    fn test_palette_is_distinct() {
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
        assert_ne!(colors[1], colors[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_fit_lines_share_fit_color() {
        let panel = Panel::new("p", "x", "y")
            .with_series(Series::new("a", SeriesStyle::Scatter, vec![]))
            .with_series(Series::new("fit", SeriesStyle::DashedLine, vec![]))
            .with_series(Series::new("b", SeriesStyle::LinePoints, vec![]));
        let colors = panel_colors(&panel);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[1], FIT_COLOR);
        assert_ne!(colors[0], colors[2]);
    }
}
