//! Backend-independent description of a diagnostic figure.
//!
//! Reducers describe *what* to draw; [`crate::ui`] decides how.

use crate::fit::LinearFit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    Scatter,
    Line,
    DashedLine,
    LinePoints,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub style: SeriesStyle,
    pub points: Vec<[f64; 2]>,
}

impl Series {
    pub fn new(name: impl Into<String>, style: SeriesStyle, points: Vec<[f64; 2]>) -> Self {
        Series {
            name: name.into(),
            style,
            points,
        }
    }

    /// Pair up `x` and `y`; extra values on either side are dropped.
    pub fn from_xy(name: impl Into<String>, style: SeriesStyle, x: &[f64], y: &[f64]) -> Self {
        let points = x.iter().zip(y).map(|(&xi, &yi)| [xi, yi]).collect();
        Series::new(name, style, points)
    }

    /// The fitted line drawn across `[x_min, x_max]` of the data it came from.
    pub fn fit_line(name: impl Into<String>, style: SeriesStyle, fit: &LinearFit, x: &[f64]) -> Self {
        let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let points = if x_min.is_finite() && x_max.is_finite() {
            vec![[x_min, fit.predict(x_min)], [x_max, fit.predict(x_max)]]
        } else {
            Vec::new()
        };
        Series::new(name, style, points)
    }
}

/// One subplot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Summary text shown with the panel.
    pub annotation: Option<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Panel {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            ..Default::default()
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_annotation(mut self, text: impl Into<String>) -> Self {
        self.annotation = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Figure {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    /// `(rows, cols)` of the subplot grid.
    pub fn shape(&self) -> (usize, usize) {
        grid_shape(self.panels.len())
    }
}

/// Smallest near-square grid holding `n` panels: `cols = ceil(sqrt(n))`,
/// `rows = ceil(n / cols)`.
pub fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let mut cols = 1;
    while cols * cols < n {
        cols += 1;
    }
    let rows = n.div_ceil(cols);
    (rows, cols)
}
