//! Surface tension of water by pulling a wire frame out of the surface.
//!
//! Each row holds the balance reading at the moment before the film breaks
//! (`m2`), the reading after it breaks (`m3`), both in grams, and the wire
//! length `l` in centimetres. The film has two faces, so
//! `σ = Δm·g / (2·l)`.

use std::fmt;

use serde::Deserialize;

use crate::data::model::Table;
use crate::figure::{Figure, Panel, Series, SeriesStyle};
use crate::fit::mean;
use crate::quantity::{Derived, Quantity};
use crate::report::{self, Report};
use crate::units::{Centimeters, Grams, Kilograms, Meters};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Local gravitational acceleration, m/s².
    pub gravity: f64,
    /// Half-width of the balance reading error (triangular distribution).
    pub balance_half_width: Grams,
    /// Coverage factor for the expanded uncertainty.
    pub coverage_factor: f64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            gravity: 9.7883,
            balance_half_width: Grams(0.001),
            coverage_factor: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassReading {
    pub m2: Grams,
    pub m3: Grams,
    pub length: Centimeters,
}

impl MassReading {
    pub fn delta_m(&self) -> Grams {
        Grams(self.m2.value() - self.m3.value())
    }
}

/// Rows with fewer than three cells or an empty length are skipped, as are
/// rows with non-numeric cells.
pub fn read_readings(table: &Table) -> Vec<MassReading> {
    let mut readings = Vec::with_capacity(table.len());
    for (row, cells) in table.rows.iter().enumerate() {
        if cells.len() < 3 || cells[2].trim().is_empty() {
            log::warn!("Skipping row {} due to missing length data: {cells:?}", row + 1);
            continue;
        }
        let parsed: Option<Vec<f64>> = (0..3).map(|col| table.cell(row, col).as_f64()).collect();
        match parsed.as_deref() {
            Some(&[m2, m3, l]) => readings.push(MassReading {
                m2: Grams(m2),
                m3: Grams(m3),
                length: Centimeters(l),
            }),
            _ => log::warn!("Skipping row {} due to invalid data: {cells:?}", row + 1),
        }
    }
    readings
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// σ in N/m from mean mass difference and mean wire length.
pub fn surface_tension(mean_delta_m: Grams, mean_length: Centimeters, gravity: f64) -> Derived {
    let delta_m = Kilograms::from(mean_delta_m).value();
    let length = Meters::from(mean_length).value();
    if length <= 0.0 {
        return Derived::undefined(format!("mean wire length must be positive, got {length} m"));
    }
    Derived::from_finite(delta_m * gravity / (2.0 * length), "surface tension")
}

/// Standard and expanded uncertainty of σ from the balance resolution only.
///
/// The reading error is triangular with half-width `a`, so `u(m) = a/√6`;
/// the sensitivity of σ to Δm is `g / (2·l)`.
pub fn mass_uncertainty(mean_length: Centimeters, params: &Params) -> (Derived, Derived) {
    let length = Meters::from(mean_length).value();
    if length <= 0.0 {
        let undefined = Derived::undefined("mean wire length must be positive");
        return (undefined.clone(), undefined);
    }
    let u_m = Kilograms::from(params.balance_half_width).value() / 6f64.sqrt();
    let sensitivity = params.gravity / (2.0 * length);
    let standard = sensitivity.abs() * u_m;
    (
        Derived::from_finite(standard, "standard uncertainty"),
        Derived::from_finite(params.coverage_factor * standard, "expanded uncertainty"),
    )
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub readings: Vec<MassReading>,
    pub surface_tension: Derived,
    pub standard_uncertainty: Derived,
    pub expanded_uncertainty: Derived,
}

pub fn reduce(table: &Table, params: &Params) -> Outcome {
    reduce_readings(read_readings(table), params)
}

pub fn reduce_readings(readings: Vec<MassReading>, params: &Params) -> Outcome {
    let deltas: Vec<f64> = readings.iter().map(|r| r.delta_m().value()).collect();
    let lengths: Vec<f64> = readings.iter().map(|r| r.length.value()).collect();

    let (sigma, standard, expanded) = match (mean(&deltas), mean(&lengths)) {
        (Some(dm), Some(l)) => {
            let sigma = surface_tension(Grams(dm), Centimeters(l), params.gravity);
            let (standard, expanded) = mass_uncertainty(Centimeters(l), params);
            (sigma, standard, expanded)
        }
        _ => {
            log::warn!("No valid readings; surface tension cannot be computed");
            let undefined = Derived::undefined("no valid data");
            (undefined.clone(), undefined.clone(), undefined)
        }
    };

    Outcome {
        readings,
        surface_tension: sigma,
        standard_uncertainty: standard,
        expanded_uncertainty: expanded,
    }
}

impl Outcome {
    fn quantities(&self) -> [Quantity; 3] {
        [
            Quantity::new("Surface tension σ", "N/m", self.surface_tension.clone()).scientific(4),
            Quantity::new("Combined standard uncertainty (mass only)", "N/m", self.standard_uncertainty.clone())
                .scientific(4),
            Quantity::new("Expanded uncertainty (mass only, k=2)", "N/m", self.expanded_uncertainty.clone())
                .scientific(4),
        ]
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} valid reading(s)", self.readings.len())?;
        report::write_section(f, "Surface tension", &self.quantities())?;
        match (self.surface_tension.value(), self.expanded_uncertainty.value()) {
            (Some(sigma), Some(u)) => writeln!(f, "Result (mass uncertainty only): ({sigma:.4e} ± {u:.4e}) N/m"),
            _ => writeln!(f, "Result: N/A (no valid data)"),
        }
    }
}

impl Report for Outcome {
    fn figure(&self) -> Option<Figure> {
        if self.readings.is_empty() {
            return None;
        }
        let points = self
            .readings
            .iter()
            .enumerate()
            .map(|(i, r)| [(i + 1) as f64, r.delta_m().value()])
            .collect();
        let panel = Panel::new("Mass difference per trial", "Trial", "m2 - m3 (g)")
            .with_series(Series::new("Δm", SeriesStyle::LinePoints, points))
            .with_annotation(report::annotation(&self.quantities()));
        Some(Figure::new("Surface tension").with_panel(panel))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use statrs::assert_almost_eq;

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn reading(m2: f64, m3: f64, l: f64) -> MassReading {
        MassReading {
            m2: Grams(m2),
            m3: Grams(m3),
            length: Centimeters(l),
        }
    }

    #[test]
    fn test_surface_tension_units() {
        // Δm = 0.2795 g, l = 3.0 cm
        let sigma = surface_tension(Grams(0.2795), Centimeters(3.0), 9.7883);
        let expected = 0.2795e-3 * 9.7883 / (2.0 * 0.03);
        assert_almost_eq!(sigma.value().unwrap(), expected, 1e-15);
    }

    #[test]
    fn test_uncertainty() {
        let params = Params::default();
        let (u_c, u) = mass_uncertainty(Centimeters(3.0), &params);
        let expected = 9.7883 / (2.0 * 0.03) * (0.001e-3 / 6f64.sqrt());
        assert_almost_eq!(u_c.value().unwrap(), expected, 1e-15);
        assert_almost_eq!(u.value().unwrap(), 2.0 * expected, 1e-15);
    }

    #[test]
    fn test_zero_length_is_undefined() {
        assert!(!surface_tension(Grams(0.3), Centimeters(0.0), 9.8).is_defined());
        assert!(!mass_uncertainty(Centimeters(0.0), &Params::default()).1.is_defined());
    }

    #[test]
    fn test_read_readings_skips_bad_rows() {
        let table = Table::new(
            owned(&["m2 (g)", "m3 (g)", "l (cm)"]),
            vec![
                owned(&["3.1200", "2.8400", "3.002"]),
                owned(&["3.1", "2.8", ""]),
                owned(&["3.1", "2.8"]),
                owned(&["abc", "2.8", "3.0"]),
                owned(&["3.1300", "2.8500", "3.004"]),
            ],
        );
        let readings = read_readings(&table);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].length, Centimeters(3.004));
    }

    #[test]
    fn test_reduce_empty_is_undefined() {
        let table = Table::new(owned(&["m2", "m3", "l"]), vec![]);
        let outcome = reduce(&table, &Params::default());
        assert!(!outcome.surface_tension.is_defined());
        assert!(!outcome.expanded_uncertainty.is_defined());
        assert!(outcome.figure().is_none());
        assert!(outcome.to_string().contains("N/A"));
    }

    #[test]
    fn test_reduce_reports_plus_minus() {
        let outcome = reduce_readings(vec![reading(3.12, 2.84, 3.0), reading(3.13, 2.85, 3.0)], &Params::default());
        let sigma = outcome.surface_tension.value().unwrap();
        assert!(sigma > 0.04 && sigma < 0.05, "σ = {sigma}");
        assert!(outcome.to_string().contains('±'));
    }

    proptest! {
        #[test]
        fn permutation_does_not_change_sigma(
            triples in prop::collection::vec((2.5f64..3.5, 2.0f64..2.5, 2.5f64..3.5), 1..12),
            seed in any::<u64>(),
        ) {
            let readings: Vec<MassReading> = triples.iter().map(|&(a, b, c)| reading(a, b, c)).collect();
            let mut shuffled = readings.clone();
            // Deterministic rotation + reversal driven by the seed.
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            if seed % 2 == 1 {
                shuffled.reverse();
            }
            let params = Params::default();
            let a = reduce_readings(readings, &params).surface_tension.value().unwrap();
            let b = reduce_readings(shuffled, &params).surface_tension.value().unwrap();
            prop_assert!((a - b).abs() <= 1e-12 * a.abs());
        }
    }
}
