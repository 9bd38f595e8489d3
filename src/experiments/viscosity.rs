//! Liquid viscosity by the falling-ball method.
//!
//! Every CSV column whose header starts with a ball label (`A1`, `B2`, ...)
//! is one drop: the times at which the ball passed equally spaced marks. The
//! terminal velocity is the slope of distance against time; Stokes' law with
//! wall and finite-depth corrections then gives the viscosity. All lengths in
//! this module are CGS.

use std::fmt;

use serde::Deserialize;

use crate::data::model::Table;
use crate::figure::{Figure, Panel, Series, SeriesStyle};
use crate::fit::{linear_fit, mean, FitError, LinearFit};
use crate::quantity::{Derived, Quantity};
use crate::report::{self, Report};
use crate::units::{Centimeters, Millimeters};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ball {
    pub label: String,
    pub diameter: Millimeters,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Spacing between successive timing marks.
    pub mark_spacing: Centimeters,
    /// cm/s²
    pub gravity: f64,
    /// g/cm³
    pub fluid_density: f64,
    /// g/cm³
    pub ball_density: f64,
    pub column_height: Centimeters,
    pub column_diameter: Centimeters,
    pub balls: Vec<Ball>,
}

impl Default for Params {
    fn default() -> Self {
        let ball = |label: &str, mm: f64| Ball {
            label: label.to_string(),
            diameter: Millimeters(mm),
        };
        Params {
            mark_spacing: Centimeters(3.43),
            gravity: 978.83,
            fluid_density: 0.96,
            ball_density: 7.829,
            column_height: Centimeters(33.77),
            column_diameter: Centimeters(6.023),
            balls: vec![ball("A", 1.500), ball("B", 1.999), ball("C", 2.495)],
        }
    }
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Stokes' law viscosity, g/(cm·s), for a ball of diameter `d` falling at
/// terminal velocity `v` (cm/s) in a column of finite width and depth.
pub fn stokes_viscosity(params: &Params, d: Centimeters, v: f64) -> Derived {
    if !v.is_finite() || v <= 0.0 {
        return Derived::undefined(format!("terminal velocity must be positive, got {v} cm/s"));
    }
    let d = d.value();
    let wall = 1.0 + 2.4 * d / params.column_diameter.value();
    let depth = 1.0 + 1.7 * d / params.column_height.value();
    let eta = d * d * params.gravity * (params.ball_density - params.fluid_density)
        / (18.0 * v * wall * depth);
    Derived::from_finite(eta, "viscosity")
}

/// Reynolds number `v·ρ·d/η` of the falling ball.
pub fn reynolds_number(params: &Params, d: Centimeters, v: f64, eta: &Derived) -> Derived {
    eta.clone().and_then(|eta| {
        if eta <= 0.0 {
            return Derived::undefined(format!("viscosity must be positive, got {eta}"));
        }
        Derived::from_finite(v * params.fluid_density * d.value() / eta, "Reynolds number")
    })
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// One drop of one ball.
#[derive(Debug, Clone)]
pub struct Trial {
    pub column: String,
    pub ball: String,
    pub diameter: Centimeters,
    /// s
    pub times: Vec<f64>,
    /// cm
    pub distances: Vec<f64>,
    pub fit: Result<LinearFit, FitError>,
    /// cm/s
    pub velocity: Derived,
    pub viscosity: Derived,
    pub reynolds: Derived,
}

#[derive(Debug, Clone)]
pub struct BallSummary {
    pub label: String,
    pub mean_viscosity: Derived,
    pub mean_reynolds: Derived,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub trials: Vec<Trial>,
    pub balls: Vec<BallSummary>,
}

fn ball_for<'p>(params: &'p Params, column: &str) -> Option<&'p Ball> {
    params.balls.iter().find(|b| column.starts_with(b.label.as_str()))
}

fn reduce_trial(params: &Params, column: &str, ball: &Ball, times: Vec<f64>) -> Trial {
    let spacing = params.mark_spacing.value();
    let distances: Vec<f64> = (1..=times.len()).map(|i| spacing * i as f64).collect();
    let fit = linear_fit(&times, &distances);
    let diameter = Centimeters::from(ball.diameter);

    let velocity = match &fit {
        Ok(fit) => Derived::from_finite(fit.slope, "velocity"),
        Err(err) => Derived::undefined(err.to_string()),
    };
    let viscosity = velocity
        .clone()
        .and_then(|v| stokes_viscosity(params, diameter, v));
    let reynolds = velocity
        .clone()
        .and_then(|v| reynolds_number(params, diameter, v, &viscosity));
    if let Some(reason) = viscosity.reason() {
        log::warn!("Viscosity for {column} is undefined: {reason}");
    }

    Trial {
        column: column.to_string(),
        ball: ball.label.clone(),
        diameter,
        times,
        distances,
        fit,
        velocity,
        viscosity,
        reynolds,
    }
}

fn mean_of_defined<'a>(values: impl Iterator<Item = &'a Derived>) -> Derived {
    let defined: Vec<f64> = values.filter_map(Derived::value).collect();
    match mean(&defined) {
        Some(m) => Derived::Value(m),
        None => Derived::undefined("no valid trials"),
    }
}

pub fn reduce(table: &Table, params: &Params) -> Outcome {
    let mut trials = Vec::new();
    for (idx, header) in table.headers.iter().enumerate() {
        let Some(ball) = ball_for(params, header) else {
            continue;
        };
        let times = table.numeric_column(idx);
        if times.len() < 2 {
            log::warn!(
                "Skipping column '{header}': {} time value(s), need at least 2",
                times.len()
            );
            continue;
        }
        trials.push(reduce_trial(params, header, ball, times));
    }

    let balls = params
        .balls
        .iter()
        .filter(|b| trials.iter().any(|t| t.ball == b.label))
        .map(|b| {
            let of_ball: Vec<&Trial> = trials.iter().filter(|t| t.ball == b.label).collect();
            BallSummary {
                label: b.label.clone(),
                mean_viscosity: mean_of_defined(of_ball.iter().map(|t| &t.viscosity)),
                mean_reynolds: mean_of_defined(of_ball.iter().map(|t| &t.reynolds)),
            }
        })
        .collect();

    Outcome { trials, balls }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let viscosities: Vec<Quantity> = self
            .trials
            .iter()
            .map(|t| Quantity::new(format!("η_{}", t.column), "g/(cm·s)", t.viscosity.clone()))
            .collect();
        report::write_section(f, "Viscosity (per drop)", &viscosities)?;

        let reynolds: Vec<Quantity> = self
            .trials
            .iter()
            .map(|t| Quantity::new(format!("Re_{}", t.column), "", t.reynolds.clone()))
            .collect();
        report::write_section(f, "Reynolds number (per drop)", &reynolds)?;

        let mean_eta: Vec<Quantity> = self
            .balls
            .iter()
            .map(|b| Quantity::new(format!("mean η_{}", b.label), "g/(cm·s)", b.mean_viscosity.clone()))
            .collect();
        report::write_section(f, "Mean viscosity (per ball)", &mean_eta)?;

        let mean_re: Vec<Quantity> = self
            .balls
            .iter()
            .map(|b| Quantity::new(format!("mean Re_{}", b.label), "", b.mean_reynolds.clone()))
            .collect();
        report::write_section(f, "Mean Reynolds number (per ball)", &mean_re)
    }
}

impl Report for Outcome {
    fn figure(&self) -> Option<Figure> {
        if self.trials.is_empty() {
            return None;
        }
        let mut figure = Figure::new("Falling-ball viscometer");
        for trial in &self.trials {
            let mut panel = Panel::new(trial.column.clone(), "t (s)", "s (cm)").with_series(
                Series::from_xy("data", SeriesStyle::Scatter, &trial.times, &trial.distances),
            );
            if let Ok(fit) = &trial.fit {
                panel = panel.with_series(Series::fit_line(
                    format!("v={:.2} cm/s\nR²={:.3}", fit.slope, fit.r_squared()),
                    SeriesStyle::DashedLine,
                    fit,
                    &trial.times,
                ));
            }
            panel = panel.with_annotation(report::annotation(&[
                Quantity::new("η", "g/(cm·s)", trial.viscosity.clone()),
                Quantity::new("Re", "", trial.reynolds.clone()),
            ]));
            figure = figure.with_panel(panel);
        }
        Some(figure)
    }
}
