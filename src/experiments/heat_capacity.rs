//! Ratio of specific heats of air (Clément–Desormes method).
//!
//! Each row is one trial: the transducer reading after pumping (state I,
//! `P1_mV`) and after the adiabatic release and isochoric warm-up (state III,
//! `P2_mV`). With ambient pressure P0,
//! `γ = ln(P1/P0) / ln(P1/P2)` in absolute pressures.

use std::fmt;

use serde::Deserialize;

use crate::data::model::Table;
use crate::figure::{Figure, Panel, Series, SeriesStyle};
use crate::fit::mean;
use crate::quantity::{Derived, Quantity, UNDEFINED_MARKER};
use crate::report::{self, Report};
use crate::units::{Millivolts, Pascals, SensorGain};

pub const CONDITION_COLUMN: &str = "Condition";
pub const TRIAL_COLUMN: &str = "Trial";
pub const P1_COLUMN: &str = "P1_mV";
pub const P2_COLUMN: &str = "P2_mV";
pub const GAMMA_COLUMN: &str = "Gamma";

/// γ of an ideal diatomic gas, drawn as a reference line.
const DIATOMIC_GAMMA: f64 = 1.4;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Mean ambient pressure over the session.
    pub ambient_pressure: Pascals,
    pub sensor: SensorGain,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            ambient_pressure: Pascals(100345.0),
            sensor: SensorGain::default(),
        }
    }
}

/// γ from two transducer readings.
///
/// Defined only when the absolute pressures satisfy `P1 > P2 > P0`; anything
/// else would put a non-positive value under a logarithm or flip the sign.
pub fn gamma(p1: Millivolts, p2: Millivolts, params: &Params) -> Derived {
    let p0 = params.ambient_pressure;
    let p1_abs = Pascals::absolute_from_gauge(p1.to_gauge(params.sensor), p0);
    let p2_abs = Pascals::absolute_from_gauge(p2.to_gauge(params.sensor), p0);

    if !(p1_abs > p2_abs && p2_abs > p0) {
        let reason = format!(
            "pressures must satisfy P1 > P2 > P0 (P0={:.1}, P1={:.1}, P2={:.1})",
            p0, p1_abs, p2_abs
        );
        log::warn!("Gamma undefined: {reason}");
        return Derived::undefined(reason);
    }

    let gamma = (p1_abs.value() / p0.value()).ln() / (p1_abs.value() / p2_abs.value()).ln();
    Derived::from_finite(gamma, "gamma")
}

/// Text written to the `Gamma` column.
pub fn format_gamma(gamma: &Derived) -> String {
    gamma.format_with(|g| format!("{g:.6}"))
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GammaTrial {
    /// Zero-based data row in the source table.
    pub row: usize,
    pub trial: u32,
    pub p1: Millivolts,
    pub p2: Millivolts,
    pub gamma: Derived,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSummary {
    pub condition: String,
    pub trials: Vec<GammaTrial>,
    pub mean_gamma: Derived,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    /// In order of first appearance in the file.
    pub conditions: Vec<ConditionSummary>,
    /// γ for every table row; skipped rows are undefined.
    pub row_gammas: Vec<Derived>,
    /// False when a required column is missing and no row was read.
    pub columns_found: bool,
}

struct Columns {
    condition: usize,
    trial: usize,
    p1: usize,
    p2: usize,
}

fn locate_columns(table: &Table) -> Option<Columns> {
    let find = |name: &str| {
        let idx = table.column_index(name);
        if idx.is_none() {
            log::warn!("Column '{name}' not found in the CSV data");
        }
        idx
    };
    Some(Columns {
        condition: find(CONDITION_COLUMN)?,
        trial: find(TRIAL_COLUMN)?,
        p1: find(P1_COLUMN)?,
        p2: find(P2_COLUMN)?,
    })
}

fn read_trial(table: &Table, cols: &Columns, row: usize) -> Option<(String, u32, f64, f64)> {
    let condition = table.raw(row, cols.condition).trim();
    if condition.is_empty() {
        log::warn!("Skipping row {}: empty {CONDITION_COLUMN}", row + 1);
        return None;
    }
    let Ok(trial) = table.raw(row, cols.trial).trim().parse::<u32>() else {
        log::warn!(
            "Skipping row {}: {TRIAL_COLUMN} '{}' is not a whole number",
            row + 1,
            table.raw(row, cols.trial)
        );
        return None;
    };
    let (Some(p1), Some(p2)) = (
        table.cell(row, cols.p1).as_f64(),
        table.cell(row, cols.p2).as_f64(),
    ) else {
        log::warn!("Skipping row {}: pressure readings are not numbers", row + 1);
        return None;
    };
    Some((condition.to_string(), trial, p1, p2))
}

pub fn reduce(table: &Table, params: &Params) -> Outcome {
    let mut row_gammas = vec![Derived::undefined("row skipped"); table.len()];
    let mut conditions: Vec<ConditionSummary> = Vec::new();

    let columns = locate_columns(table);
    if let Some(cols) = &columns {
        for row in 0..table.len() {
            let Some((condition, trial, p1, p2)) = read_trial(table, cols, row) else {
                continue;
            };
            let (p1, p2) = (Millivolts(p1), Millivolts(p2));
            let g = gamma(p1, p2, params);
            row_gammas[row] = g.clone();

            let entry = GammaTrial {
                row,
                trial,
                p1,
                p2,
                gamma: g,
            };
            match conditions.iter_mut().find(|c| c.condition == condition) {
                Some(summary) => summary.trials.push(entry),
                None => conditions.push(ConditionSummary {
                    condition,
                    trials: vec![entry],
                    mean_gamma: Derived::undefined("no valid data"),
                }),
            }
        }
    }

    for summary in &mut conditions {
        let valid: Vec<f64> = summary.trials.iter().filter_map(|t| t.gamma.value()).collect();
        if let Some(m) = mean(&valid) {
            summary.mean_gamma = Derived::Value(m);
        }
    }

    Outcome {
        conditions,
        row_gammas,
        columns_found: columns.is_some(),
    }
}

/// The source table with a `Gamma` column appended (or refreshed), `None`
/// when the table lacks the columns γ is computed from.
pub fn annotate(table: &Table, outcome: &Outcome) -> Option<Table> {
    if !outcome.columns_found {
        return None;
    }
    let values = outcome.row_gammas.iter().map(format_gamma).collect();
    Some(table.clone().with_column(GAMMA_COLUMN, values))
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.conditions {
            writeln!(f, "--- {} ---", summary.condition)?;
            for t in &summary.trials {
                writeln!(
                    f,
                    "Trial {}: P1_mV={}, P2_mV={}, Gamma={:.4}",
                    t.trial,
                    t.p1.value(),
                    t.p2.value(),
                    t.gamma
                )?;
            }
            writeln!(f, "{}", "-".repeat(summary.condition.chars().count() + 8))?;
        }

        writeln!(f, "\n--- Mean heat capacity ratio ---")?;
        for summary in &self.conditions {
            match summary.mean_gamma.value() {
                Some(g) => writeln!(f, "{} mean Gamma: {g:.4}", summary.condition)?,
                None => writeln!(f, "{} mean Gamma: {UNDEFINED_MARKER} (no valid data)", summary.condition)?,
            }
        }
        Ok(())
    }
}

impl Report for Outcome {
    fn figure(&self) -> Option<Figure> {
        if self.conditions.is_empty() {
            return None;
        }
        let mut panel = Panel::new("γ per trial", "Trial", "γ");
        let mut trial_numbers = Vec::new();
        for summary in &self.conditions {
            let points: Vec<[f64; 2]> = summary
                .trials
                .iter()
                .filter_map(|t| t.gamma.value().map(|g| [f64::from(t.trial), g]))
                .collect();
            trial_numbers.extend(summary.trials.iter().map(|t| f64::from(t.trial)));
            panel = panel.with_series(Series::new(summary.condition.clone(), SeriesStyle::LinePoints, points));
        }

        let lo = trial_numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = trial_numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            panel = panel.with_series(Series::new(
                "diatomic ideal gas",
                SeriesStyle::DashedLine,
                vec![[lo, DIATOMIC_GAMMA], [hi, DIATOMIC_GAMMA]],
            ));
        }

        let means: Vec<Quantity> = self
            .conditions
            .iter()
            .map(|s| Quantity::new(format!("mean γ ({})", s.condition), "", s.mean_gamma.clone()))
            .collect();
        let panel = panel.with_annotation(report::annotation(&means));
        Some(Figure::new("Heat capacity ratio of air").with_panel(panel))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use statrs::assert_almost_eq;

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            owned(&["Condition", "Trial", "P1_mV", "P2_mV"]),
            rows.iter().map(|r| owned(r)).collect(),
        )
    }

    #[test]
    fn test_gamma_finite_for_ordered_pressures() {
        let params = Params::default();
        let g = gamma(Millivolts(40.0), Millivolts(10.0), &params);
        let expected = (102345.0_f64 / 100345.0).ln() / (102345.0_f64 / 100845.0).ln();
        assert_almost_eq!(g.value().unwrap(), expected, 1e-12);
        assert!(g.value().unwrap() > 1.0);
    }

    #[test]
    fn test_gamma_undefined_when_p2_not_above_ambient() {
        let params = Params::default();
        assert!(!gamma(Millivolts(40.0), Millivolts(0.0), &params).is_defined());
        assert!(!gamma(Millivolts(40.0), Millivolts(-3.0), &params).is_defined());
    }

    #[test]
    fn test_gamma_undefined_when_p1_not_above_p2() {
        let params = Params::default();
        assert!(!gamma(Millivolts(10.0), Millivolts(10.0), &params).is_defined());
        assert!(!gamma(Millivolts(5.0), Millivolts(10.0), &params).is_defined());
    }

    #[test]
    fn test_reduce_groups_by_condition_in_file_order() {
        let t = table(&[
            &["warm", "1", "40", "10"],
            &["cold", "1", "42", "11"],
            &["warm", "2", "38", "0"],
            &["warm", "3", "x", "9"],
        ]);
        let outcome = reduce(&t, &Params::default());
        assert_eq!(outcome.conditions.len(), 2);
        assert_eq!(outcome.conditions[0].condition, "warm");
        assert_eq!(outcome.conditions[0].trials.len(), 2);
        assert_eq!(outcome.row_gammas.len(), 4);
        assert!(outcome.row_gammas[0].is_defined());
        assert!(!outcome.row_gammas[2].is_defined());
        assert!(!outcome.row_gammas[3].is_defined());

        // Undefined trials are left out of the mean.
        assert_almost_eq!(
            outcome.conditions[0].mean_gamma.value().unwrap(),
            outcome.row_gammas[0].value().unwrap(),
            1e-12
        );
    }

    #[test]
    fn test_condition_without_valid_trials() {
        let t = table(&[&["bad", "1", "40", "0"]]);
        let outcome = reduce(&t, &Params::default());
        assert!(!outcome.conditions[0].mean_gamma.is_defined());
        assert!(outcome.to_string().contains("bad mean Gamma: N/A"));
    }

    #[test]
    fn test_missing_column_skips_everything() {
        let t = Table::new(owned(&["Condition", "Trial", "P1_mV"]), vec![owned(&["a", "1", "4"])]);
        let outcome = reduce(&t, &Params::default());
        assert!(outcome.conditions.is_empty());
        assert_eq!(format_gamma(&outcome.row_gammas[0]), "N/A");
        assert!(outcome.figure().is_none());
        assert!(annotate(&t, &outcome).is_none());
    }

    #[test]
    fn test_annotate_appends_formatted_column() {
        let t = table(&[&["warm", "1", "40", "10"], &["warm", "2", "38", "0"]]);
        let outcome = reduce(&t, &Params::default());
        let annotated = annotate(&t, &outcome).unwrap();
        assert_eq!(annotated.headers.last().unwrap(), "Gamma");
        let expected = format!("{:.6}", outcome.row_gammas[0].value().unwrap());
        assert_eq!(annotated.raw(0, 4), expected);
        assert_eq!(annotated.raw(1, 4), "N/A");

        // Running again refreshes the column instead of adding another.
        let again = annotate(&annotated, &reduce(&annotated, &Params::default())).unwrap();
        assert_eq!(again.headers.len(), 5);
    }

    #[test]
    fn test_figure_series_per_condition() {
        let t = table(&[&["warm", "1", "40", "10"], &["cold", "1", "42", "11"]]);
        let figure = reduce(&t, &Params::default()).figure().unwrap();
        assert_eq!(figure.panels.len(), 1);
        // Two conditions plus the reference line.
        assert_eq!(figure.panels[0].series.len(), 3);
    }
}
