/// The experiment pipelines. Each module turns one [`Table`] into a
/// [`Report`]; none of them depends on another.
///
/// ```text
///   data.csv ──► loader ──► Table ──► <experiment>::reduce ──► Outcome
///                                                               │
///                                  console text ◄── Display ────┤
///                                  figure window ◄── figure() ──┘
/// ```
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::config;
use crate::data::loader::{load_csv, write_csv};
use crate::report::Report;

pub mod heat_capacity;
pub mod photoelectric;
pub mod solenoid;
pub mod surface_tension;
pub mod viscosity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentKind {
    Photoelectric,
    Viscosity,
    HeatCapacity,
    SolenoidCurrent,
    SolenoidAxis,
    SurfaceTension,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 6] = [
        ExperimentKind::Photoelectric,
        ExperimentKind::Viscosity,
        ExperimentKind::HeatCapacity,
        ExperimentKind::SolenoidCurrent,
        ExperimentKind::SolenoidAxis,
        ExperimentKind::SurfaceTension,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ExperimentKind::Photoelectric => "photoelectric",
            ExperimentKind::Viscosity => "viscosity",
            ExperimentKind::HeatCapacity => "heat-capacity",
            ExperimentKind::SolenoidCurrent => "solenoid-current",
            ExperimentKind::SolenoidAxis => "solenoid-axis",
            ExperimentKind::SurfaceTension => "surface-tension",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExperimentKind::Photoelectric => "Planck's constant from stopping voltages",
            ExperimentKind::Viscosity => "liquid viscosity by the falling-ball method",
            ExperimentKind::HeatCapacity => "heat capacity ratio of air (writes a Gamma column)",
            ExperimentKind::SolenoidCurrent => "solenoid induced voltage against drive current",
            ExperimentKind::SolenoidAxis => "solenoid field profile along the axis",
            ExperimentKind::SurfaceTension => "surface tension by the wire-frame method",
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown experiment '{0}'")]
pub struct UnknownExperiment(pub String);

impl FromStr for ExperimentKind {
    type Err = UnknownExperiment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperimentKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| UnknownExperiment(s.to_string()))
    }
}

/// Load `data_path`, reduce it and return the report.
///
/// `heat-capacity` additionally writes its input back with a `Gamma` column.
pub fn run(kind: ExperimentKind, data_path: &Path) -> Result<Box<dyn Report>> {
    let params_path = config::params_path_for(data_path);
    let table = load_csv(data_path).with_context(|| format!("loading {kind} data"))?;
    if table.is_empty() {
        log::warn!("{} has no data rows", data_path.display());
    }

    let report: Box<dyn Report> = match kind {
        ExperimentKind::Photoelectric => {
            let params = config::load_params(&params_path)?;
            Box::new(photoelectric::reduce(&table, &params))
        }
        ExperimentKind::Viscosity => {
            let params = config::load_params(&params_path)?;
            Box::new(viscosity::reduce(&table, &params))
        }
        ExperimentKind::HeatCapacity => {
            let params = config::load_params(&params_path)?;
            let outcome = heat_capacity::reduce(&table, &params);
            match heat_capacity::annotate(&table, &outcome) {
                Some(annotated) => {
                    write_csv(data_path, &annotated).context("writing Gamma column back")?;
                    log::info!("Wrote {} column to {}", heat_capacity::GAMMA_COLUMN, data_path.display());
                }
                None => log::warn!("Leaving {} unchanged: required columns are missing", data_path.display()),
            }
            Box::new(outcome)
        }
        ExperimentKind::SolenoidCurrent => Box::new(solenoid::reduce_current_sweep(&table)),
        ExperimentKind::SolenoidAxis => {
            let params = config::load_params(&params_path)?;
            Box::new(solenoid::reduce_axial_profile(&table, &params))
        }
        ExperimentKind::SurfaceTension => {
            let params = config::load_params(&params_path)?;
            Box::new(surface_tension::reduce(&table, &params))
        }
    };
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for kind in ExperimentKind::ALL {
            assert_eq!(kind.key().parse::<ExperimentKind>(), Ok(kind));
        }
        assert_eq!(
            "planck".parse::<ExperimentKind>(),
            Err(UnknownExperiment("planck".to_string()))
        );
    }

    #[test]
    fn test_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = run(ExperimentKind::Viscosity, &dir.path().join("data.csv")) else {
            panic!("a missing input file should abort the run");
        };
        let load_err = err.downcast_ref::<crate::data::loader::LoadError>().unwrap();
        assert!(matches!(load_err, crate::data::loader::LoadError::FileNotFound(_)));
    }

    #[test]
    fn test_heat_capacity_without_pressure_column_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let content = "Condition,Trial,P1_mV\nfast,1,42.3\n";
        std::fs::write(&path, content).unwrap();

        let report = run(ExperimentKind::HeatCapacity, &path).unwrap();
        assert!(report.figure().is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }
}
