//! Planck's constant from the photoelectric effect.
//!
//! Input columns come in pairs per mercury line, e.g. `U(V) 365nm` and
//! `I (10^-12 A) 365nm`. The stopping voltage of each line is read off the
//! I–U curves by the experimenter and supplied through [`Params`]; the fit of
//! stopping voltage against light frequency gives `h/e` as slope and `-A/e`
//! as intercept.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::data::model::Table;
use crate::figure::{Figure, Panel, Series, SeriesStyle};
use crate::fit::{linear_fit, FitError, LinearFit};
use crate::quantity::{Derived, Quantity};
use crate::report::{self, Report};
use crate::units::{Hertz, Nanometers};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Stopping voltage (V) per wavelength label, e.g. `"365nm": 1.8`.
    pub stopping_voltages: BTreeMap<String, f64>,
    /// C
    pub elementary_charge: f64,
    /// Reference value of h used for the relative error, J·s.
    pub accepted_planck: f64,
}

impl Default for Params {
    fn default() -> Self {
        let stopping_voltages = [
            ("365nm", 1.8),
            ("405nm", 1.6),
            ("436nm", 1.5),
            ("546nm", 0.8),
            ("577nm", 0.7),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Params {
            stopping_voltages,
            elementary_charge: 1.602e-19,
            accepted_planck: 6.626e-34,
        }
    }
}

// ---------------------------------------------------------------------------
// Column discovery
// ---------------------------------------------------------------------------

/// One I–U curve as measured for a single mercury line.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentCurve {
    /// Wavelength label as written in the header, e.g. `365nm`.
    pub label: String,
    pub wavelength: Nanometers,
    pub frequency: Hertz,
    /// Current column unit is `10^exponent A`.
    pub current_exponent: i32,
    /// V
    pub voltage: Vec<f64>,
    /// In units of `10^current_exponent` A.
    pub current: Vec<f64>,
}

impl CurrentCurve {
    pub fn current_unit(&self) -> String {
        format!("10^{} A", self.current_exponent)
    }
}

/// Parse the exponent out of a current header such as `I (10^-13 A) 405nm`.
fn current_exponent(header: &str) -> Option<i32> {
    let rest = header.split("10^").nth(1)?;
    let end = rest
        .find(|c: char| c != '-' && c != '+' && !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn wavelength_label(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

/// Find the current column belonging to `label`.
fn current_column<'t>(table: &'t Table, label: &str) -> Option<(usize, &'t str, i32)> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim_start().starts_with("I (") && h.split_whitespace().last() == Some(label))
        .find_map(|(i, h)| current_exponent(h).map(|exp| (i, h.as_str(), exp)))
}

/// Collect every I–U curve for which both a voltage and a current column exist.
pub fn current_curves(table: &Table) -> Vec<CurrentCurve> {
    let mut curves = Vec::new();
    for (u_idx, u_header) in table.columns_containing("U(V)") {
        let Some(label) = wavelength_label(u_header) else {
            log::warn!("Voltage column '{u_header}' has no wavelength label");
            continue;
        };
        let Some((i_idx, i_header, exponent)) = current_column(table, label) else {
            log::warn!("Current column for {label} not found in the CSV data");
            continue;
        };
        let Ok(nm) = label.trim_end_matches("nm").parse::<f64>() else {
            log::warn!("Cannot read a wavelength from '{label}'");
            continue;
        };
        log::debug!("Pairing '{u_header}' with '{i_header}'");

        let (voltage, current): (Vec<f64>, Vec<f64>) = table
            .numeric_rows(&[u_idx, i_idx])
            .into_iter()
            .map(|(_, v)| (v[0], v[1]))
            .unzip();
        let wavelength = Nanometers(nm);
        curves.push(CurrentCurve {
            label: label.to_string(),
            wavelength,
            frequency: wavelength.to_frequency(),
            current_exponent: exponent,
            voltage,
            current,
        });
    }
    curves
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Outcome {
    pub curves: Vec<CurrentCurve>,
    /// Hz
    pub frequencies: Vec<f64>,
    /// V
    pub stopping_voltages: Vec<f64>,
    pub fit: Result<LinearFit, FitError>,
    pub planck: Quantity,
    pub work_function: Quantity,
    pub threshold_frequency: Quantity,
    pub relative_error: Quantity,
}

pub fn reduce(table: &Table, params: &Params) -> Outcome {
    let curves = current_curves(table);

    let mut frequencies = Vec::with_capacity(curves.len());
    let mut stopping_voltages = Vec::with_capacity(curves.len());
    for curve in &curves {
        match params.stopping_voltages.get(&curve.label) {
            Some(&ua) => {
                frequencies.push(curve.frequency.value());
                stopping_voltages.push(ua);
            }
            None => log::warn!(
                "No stopping voltage configured for {}, leaving it out of the fit",
                curve.label
            ),
        }
    }

    let fit = linear_fit(&frequencies, &stopping_voltages);
    let e = params.elementary_charge;

    let (planck, work_function, threshold) = match &fit {
        Ok(fit) => (
            Derived::from_finite(fit.slope * e, "h"),
            Derived::from_finite(-fit.intercept * e, "work function"),
            match fit.x_intercept() {
                Some(nu0) => Derived::from_finite(nu0, "threshold frequency"),
                None => Derived::undefined("fitted slope is zero"),
            },
        ),
        Err(err) => {
            log::warn!("Stopping-voltage fit failed: {err}");
            let undefined = Derived::undefined(err.to_string());
            (undefined.clone(), undefined.clone(), undefined)
        }
    };
    let accepted = params.accepted_planck;
    let relative = planck
        .clone()
        .map("relative error", |h| (h - accepted).abs() / accepted * 100.0);

    Outcome {
        curves,
        frequencies,
        stopping_voltages,
        fit,
        planck: Quantity::new("Planck's constant (h)", "J·s", planck).scientific(2),
        work_function: Quantity::new("Work function (A)", "J", work_function).scientific(2),
        threshold_frequency: Quantity::new("Red limit frequency (nu_0)", "Hz", threshold)
            .scientific(2),
        relative_error: Quantity::new("Relative error in h", "%", relative).fixed(2),
    }
}

impl Outcome {
    fn quantities(&self) -> [Quantity; 4] {
        [
            self.planck.clone(),
            self.work_function.clone(),
            self.threshold_frequency.clone(),
            self.relative_error.clone(),
        ]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stopping voltages used in the fit:")?;
        for (nu, ua) in self.frequencies.iter().zip(&self.stopping_voltages) {
            writeln!(f, "  nu = {nu:.4e} Hz, Ua = {ua:.2} V")?;
        }
        if let Ok(fit) = &self.fit {
            writeln!(f, "Fit: Ua = {:.4e} * nu + {:.4} (R² = {:.4})", fit.slope, fit.intercept, fit.r_squared())?;
        }
        report::write_section(f, "Calculated values", &self.quantities())
    }
}

impl Report for Outcome {
    fn figure(&self) -> Option<Figure> {
        let mut figure = Figure::new("Photoelectric effect");
        for curve in &self.curves {
            figure = figure.with_panel(
                Panel::new(
                    format!("I-U Curve ({})", curve.label),
                    "U (V)",
                    format!("I ({})", curve.current_unit()),
                )
                .with_series(Series::from_xy(
                    curve.label.clone(),
                    SeriesStyle::Scatter,
                    &curve.voltage,
                    &curve.current,
                )),
            );
        }

        let mut fit_panel = Panel::new("Stopping Voltage vs Frequency", "Frequency (Hz)", "Stopping Voltage (V)")
            .with_series(Series::from_xy(
                "Ua",
                SeriesStyle::Scatter,
                &self.frequencies,
                &self.stopping_voltages,
            ))
            .with_annotation(report::annotation(&self.quantities()));
        if let Ok(fit) = &self.fit {
            fit_panel = fit_panel.with_series(Series::fit_line("fit", SeriesStyle::Line, fit, &self.frequencies));
        }
        Some(figure.with_panel(fit_panel))
    }
}
