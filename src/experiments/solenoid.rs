//! Magnetic field of a solenoid measured with a search coil.
//!
//! The induced EMF in the search coil is proportional to `f·B`, and `B` is
//! proportional to the drive current, so the current sweep should give
//! straight lines whose slope scales with frequency. The axial sweep maps
//! the field profile; the field falls to half its centre value near the end
//! face of the winding.

use std::fmt;

use serde::Deserialize;

use crate::data::model::{Cell, Table};
use crate::figure::{Figure, Panel, Series, SeriesStyle};
use crate::fit::{linear_fit, FitError, LinearFit};
use crate::quantity::{Derived, Quantity};
use crate::report::{self, Report};
use crate::units::{Centimeters, Hertz, Millivolts};

pub const CURRENT_COLUMN: &str = "I (mA)";
pub const VOLTAGE_PREFIX: &str = "V (mV)";
pub const POSITION_COLUMN: &str = "x (cm)";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Fraction of the centre reading that marks the edge of the field.
    pub edge_fraction: f64,
}

impl Default for Params {
    fn default() -> Self {
        Params { edge_fraction: 0.5 }
    }
}

/// Linear interpolation between two points. Returns the average y value when `x1 == x2`.
fn linear_interpolation(x1: f64, x2: f64, y1: f64, y2: f64, xp: f64) -> f64 {
    if x1 == x2 {
        return (y1 + y2) / 2.0;
    }
    y1 + (y2 - y1) / (x2 - x1) * (xp - x1)
}

// ---------------------------------------------------------------------------
// Current sweep
// ---------------------------------------------------------------------------

/// Induced voltage against drive current at one frequency.
#[derive(Debug, Clone)]
pub struct FrequencySeries {
    pub label: String,
    pub frequency: Hertz,
    /// mA
    pub current: Vec<f64>,
    /// mV
    pub voltage: Vec<f64>,
    pub fit: Result<LinearFit, FitError>,
    /// Slope per kHz of drive frequency, mV/(mA·kHz).
    pub sensitivity: Derived,
}

#[derive(Debug, Clone)]
pub struct CurrentSweep {
    pub series: Vec<FrequencySeries>,
}

/// `V (mV) 2000Hz` → 2000 Hz.
fn frequency_of(header: &str) -> Option<Hertz> {
    let label = header.strip_prefix(VOLTAGE_PREFIX)?.trim();
    let number = label.strip_suffix("Hz")?.trim();
    number.parse().ok().map(Hertz)
}

pub fn reduce_current_sweep(table: &Table) -> CurrentSweep {
    let Some(i_idx) = table.column_index(CURRENT_COLUMN) else {
        log::warn!("Column '{CURRENT_COLUMN}' not found in the CSV data");
        return CurrentSweep { series: Vec::new() };
    };

    let mut series = Vec::new();
    for (v_idx, header) in table.columns_containing(VOLTAGE_PREFIX) {
        let Some(frequency) = frequency_of(header) else {
            log::warn!("Skipping column '{header}': no frequency in header");
            continue;
        };
        let mut current = Vec::new();
        let mut voltage = Vec::new();
        for row in 0..table.len() {
            // An empty voltage cell means the point was not measured.
            if table.cell(row, v_idx) == Cell::Empty {
                continue;
            }
            match (table.cell(row, i_idx).as_f64(), table.cell(row, v_idx).as_f64()) {
                (Some(i), Some(v)) => {
                    current.push(i);
                    voltage.push(v);
                }
                _ => log::warn!("Skipping row {} of '{header}': reading is not a number", row + 1),
            }
        }

        let fit = linear_fit(&current, &voltage);
        let sensitivity = match &fit {
            Ok(fit) if frequency.value() > 0.0 => {
                Derived::from_finite(fit.slope / (frequency.value() / 1000.0), "sensitivity")
            }
            Ok(_) => Derived::undefined("frequency must be positive"),
            Err(err) => {
                log::warn!("Fit for '{header}' failed: {err}");
                Derived::undefined(err.to_string())
            }
        };
        series.push(FrequencySeries {
            label: format!("f = {} Hz", frequency.value()),
            frequency,
            current,
            voltage,
            fit,
            sensitivity,
        });
    }
    CurrentSweep { series }
}

impl fmt::Display for CurrentSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- V-I fits at x = 0 ---")?;
        for s in &self.series {
            match &s.fit {
                Ok(fit) => writeln!(
                    f,
                    "{}: V = {:.4} mV/mA * I + {:.4} mV (R² = {:.5}), {}",
                    s.label,
                    fit.slope,
                    fit.intercept,
                    fit.r_squared(),
                    Quantity::new("slope per kHz", "mV/(mA·kHz)", s.sensitivity.clone())
                )?,
                Err(err) => writeln!(f, "{}: N/A ({err})", s.label)?,
            }
        }
        Ok(())
    }
}

impl Report for CurrentSweep {
    fn figure(&self) -> Option<Figure> {
        if self.series.is_empty() {
            return None;
        }
        let mut panel = Panel::new(
            "V-I Curves at x=0 for Different Frequencies",
            "Current I (mA)",
            "Induced Voltage V (mV)",
        );
        let mut summary = Vec::new();
        for s in &self.series {
            panel = panel.with_series(Series::from_xy(s.label.clone(), SeriesStyle::LinePoints, &s.current, &s.voltage));
            summary.push(Quantity::new(format!("k/f ({})", s.label), "mV/(mA·kHz)", s.sensitivity.clone()));
        }
        let panel = panel.with_annotation(report::annotation(&summary));
        Some(Figure::new("Solenoid: current sweep").with_panel(panel))
    }
}

// ---------------------------------------------------------------------------
// Axial profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AxialProfile {
    /// cm, ascending
    pub position: Vec<f64>,
    /// mV
    pub voltage: Vec<f64>,
    /// V / V(centre)
    pub relative_field: Vec<f64>,
    pub centre_voltage: Derived,
    /// Where the field drops to `edge_fraction` of the centre value.
    pub edge_position: Derived,
}

/// First position past which `voltage` falls to `fraction · centre`.
pub fn edge_position(position: &[f64], voltage: &[f64], centre: Millivolts, fraction: f64) -> Derived {
    let centre = centre.value();
    if centre <= 0.0 {
        return Derived::undefined(format!("centre reading must be positive, got {centre} mV"));
    }
    let target = fraction * centre;
    let points: Vec<(f64, f64)> = position.iter().copied().zip(voltage.iter().copied()).collect();
    for pair in points.windows(2) {
        let ((x1, v1), (x2, v2)) = (pair[0], pair[1]);
        if v1 >= target && v2 <= target {
            // Swap roles: interpolate x as a function of V.
            return Derived::from_finite(linear_interpolation(v1, v2, x1, x2, target), "edge position");
        }
    }
    Derived::undefined(format!("reading never falls to {target:.2} mV"))
}

pub fn reduce_axial_profile(table: &Table, params: &Params) -> AxialProfile {
    let (Some(x_idx), Some(v_idx)) = (table.column_index(POSITION_COLUMN), table.column_index(VOLTAGE_PREFIX)) else {
        log::warn!("Columns '{POSITION_COLUMN}' and '{VOLTAGE_PREFIX}' are required for the axial profile");
        return AxialProfile {
            position: Vec::new(),
            voltage: Vec::new(),
            relative_field: Vec::new(),
            centre_voltage: Derived::undefined("no data"),
            edge_position: Derived::undefined("no data"),
        };
    };

    let mut points: Vec<(f64, f64)> = table
        .numeric_rows(&[x_idx, v_idx])
        .into_iter()
        .map(|(_, v)| (v[0], v[1]))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (position, voltage): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();

    let centre_voltage = match voltage.first() {
        Some(&v) => Derived::Value(v),
        None => Derived::undefined("no data"),
    };
    let relative_field = match centre_voltage.value() {
        Some(v0) if v0 != 0.0 => voltage.iter().map(|v| v / v0).collect(),
        _ => Vec::new(),
    };
    let edge_position = centre_voltage
        .clone()
        .and_then(|v0| edge_position(&position, &voltage, Millivolts(v0), params.edge_fraction));

    AxialProfile {
        position,
        voltage,
        relative_field,
        centre_voltage,
        edge_position,
    }
}

impl AxialProfile {
    fn quantities(&self) -> [Quantity; 2] {
        [
            Quantity::new("Centre reading V(0)", Millivolts::SYMBOL, self.centre_voltage.clone()).fixed(2),
            Quantity::new("Half-field edge position", Centimeters::SYMBOL, self.edge_position.clone()).fixed(2),
        ]
    }
}

impl fmt::Display for AxialProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Axial profile ---")?;
        for ((x, v), b) in self.position.iter().zip(&self.voltage).zip(&self.relative_field) {
            writeln!(f, "x = {x:5.1} cm: V = {v:8.2} mV, B/B0 = {b:.4}")?;
        }
        report::write_section(f, "Derived", &self.quantities())
    }
}

impl Report for AxialProfile {
    fn figure(&self) -> Option<Figure> {
        if self.position.is_empty() {
            return None;
        }
        let panel = Panel::new(
            "V-x Curve along Solenoid Axis",
            "Distance from Center x (cm)",
            "Induced Voltage V (mV)",
        )
        .with_series(Series::from_xy("V(x)", SeriesStyle::LinePoints, &self.position, &self.voltage))
        .with_annotation(report::annotation(&self.quantities()));
        Some(Figure::new("Solenoid: axial profile").with_panel(panel))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use statrs::assert_almost_eq;

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_interpolation() {
        assert_almost_eq!(linear_interpolation(1.0, 2.0, 3.0, 6.0, 1.25), 3.75, 1e-12);
        assert_almost_eq!(linear_interpolation(1.0, 1.0, 3.0, 6.0, 1.0), 4.5, 1e-12);
    }

    #[test]
    fn test_frequency_of() {
        assert_eq!(frequency_of("V (mV) 2000Hz"), Some(Hertz(2000.0)));
        assert_eq!(frequency_of("V (mV) 1000 Hz"), Some(Hertz(1000.0)));
        assert_eq!(frequency_of("V (mV)"), None);
    }

    #[test]
    fn test_current_sweep_fits_each_frequency() {
        let table = Table::new(
            owned(&["I (mA)", "V (mV) 4000Hz", "V (mV) 2000Hz"]),
            vec![
                owned(&["10", "334", "167"]),
                owned(&["20", "668", "334"]),
                owned(&["30", "", "501"]),
            ],
        );
        let sweep = reduce_current_sweep(&table);
        assert_eq!(sweep.series.len(), 2);
        assert_eq!(sweep.series[0].current, vec![10.0, 20.0]);
        assert_almost_eq!(sweep.series[0].fit.as_ref().unwrap().slope, 33.4, 1e-9);
        // V ∝ f·I: both frequencies give the same slope per kHz.
        assert_almost_eq!(sweep.series[0].sensitivity.value().unwrap(), 8.35, 1e-9);
        assert_almost_eq!(sweep.series[1].sensitivity.value().unwrap(), 8.35, 1e-9);
        assert_eq!(sweep.figure().unwrap().panels[0].series.len(), 2);
    }

    #[test]
    fn test_current_sweep_single_point_is_undefined() {
        let table = Table::new(owned(&["I (mA)", "V (mV) 1000Hz"]), vec![owned(&["10", "84.7"])]);
        let sweep = reduce_current_sweep(&table);
        assert!(sweep.series[0].fit.is_err());
        assert!(!sweep.series[0].sensitivity.is_defined());
    }

    #[test]
    fn test_edge_position_interpolates() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let v = [100.0, 90.0, 60.0, 40.0];
        let edge = edge_position(&x, &v, Millivolts(100.0), 0.5);
        assert_almost_eq!(edge.value().unwrap(), 2.5, 1e-12);
    }

    #[test]
    fn test_edge_position_undefined_when_field_stays_high() {
        let edge = edge_position(&[0.0, 1.0], &[100.0, 90.0], Millivolts(100.0), 0.5);
        assert!(!edge.is_defined());
        assert!(!edge_position(&[0.0], &[0.0], Millivolts(0.0), 0.5).is_defined());
    }

    #[test]
    fn test_axial_profile_sorts_and_normalises() {
        let table = Table::new(
            owned(&["x (cm)", "V (mV)"]),
            vec![
                owned(&["2", "50"]),
                owned(&["0", "200"]),
                owned(&["1", "150"]),
                owned(&["oops", "1"]),
            ],
        );
        let profile = reduce_axial_profile(&table, &Params::default());
        assert_eq!(profile.position, vec![0.0, 1.0, 2.0]);
        assert_eq!(profile.relative_field, vec![1.0, 0.75, 0.25]);
        assert_eq!(profile.centre_voltage.value(), Some(200.0));
        assert_almost_eq!(profile.edge_position.value().unwrap(), 1.5, 1e-12);
    }
}
