use std::path::{Path, PathBuf};

use lab_reduce::data::loader::load_csv;
use lab_reduce::experiments::{self, heat_capacity, viscosity, ExperimentKind};
use lab_reduce::quantity::UNDEFINED_MARKER;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn gamma_column_round_trips_through_the_file() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "data.csv",
        "Condition,Trial,P1_mV,P2_mV\n\
         fast,1,42.3,11.2\n\
         fast,2,40.1,0\n\
         slow,1,44.0,12.9\n\
         slow,2,oops,12.0\n",
    );

    let original = load_csv(&path).unwrap();
    let outcome = heat_capacity::reduce(&original, &heat_capacity::Params::default());

    let report = experiments::run(ExperimentKind::HeatCapacity, &path).unwrap();
    assert!(report.to_string().contains("fast mean Gamma"));

    let reread = load_csv(&path).unwrap();
    assert_eq!(reread.len(), 4);
    let gamma_idx = reread.column_index(heat_capacity::GAMMA_COLUMN).unwrap();
    assert_eq!(gamma_idx, 4);

    for (row, expected) in outcome.row_gammas.iter().enumerate() {
        let written = reread.raw(row, gamma_idx);
        match expected.value() {
            Some(g) => {
                let parsed: f64 = written.parse().unwrap();
                assert!((parsed - g).abs() <= 5e-7, "row {row}: {parsed} vs {g}");
                assert_eq!(written, format!("{g:.6}"));
            }
            None => assert_eq!(written, UNDEFINED_MARKER),
        }
    }

    // Reducing the rewritten file gives the same values and keeps one Gamma column.
    experiments::run(ExperimentKind::HeatCapacity, &path).unwrap();
    let again = load_csv(&path).unwrap();
    assert_eq!(again.headers.len(), 5);
    assert_eq!(again.rows, reread.rows);
}

#[test]
fn bad_row_does_not_abort_the_fit() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "data.csv", "A1,A2\n1.0,0.9\n2.0,bad\n3.0,2.7\n4.0,3.6\n");

    let table = load_csv(&path).unwrap();
    let outcome = viscosity::reduce(&table, &viscosity::Params::default());
    assert_eq!(outcome.trials.len(), 2);

    let a2 = &outcome.trials[1];
    assert_eq!(a2.times, vec![0.9, 2.7, 3.6]);
    assert!(a2.fit.is_ok());
    assert!(a2.viscosity.is_defined());
}

#[test]
fn params_file_overrides_constants() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "data.csv", "Condition,Trial,P1_mV,P2_mV\nx,1,40,10\n");

    let default_report = experiments::run(ExperimentKind::HeatCapacity, &path).unwrap().to_string();

    // Only the fields present are overridden; the sensor gain keeps its default.
    write(dir.path(), "params.json", r#"{ "ambient_pressure": 200000.0 }"#);
    let report = experiments::run(ExperimentKind::HeatCapacity, &path).unwrap().to_string();
    assert_ne!(report, default_report);
    assert!(!report.contains(UNDEFINED_MARKER));

    write(dir.path(), "params.json", "{ \"ambient_pressure\": ");
    assert!(experiments::run(ExperimentKind::HeatCapacity, &path).is_err());
}

#[test]
fn missing_input_aborts() {
    let dir = tempdir().unwrap();
    let result = experiments::run(ExperimentKind::SurfaceTension, &dir.path().join("data.csv"));
    assert!(result.is_err());
}

#[test]
fn every_experiment_reports_on_sample_shaped_data() {
    let dir = tempdir().unwrap();
    let cases = [
        (
            ExperimentKind::Photoelectric,
            "U(V) 365nm,I (10^-12 A) 365nm,U(V) 577nm,I (10^-13 A) 577nm\n-2,0,-2,0\n0,10,0,3\n",
        ),
        (ExperimentKind::SolenoidCurrent, "I (mA),V (mV) 1000Hz\n10,84.69\n20,168.3\n30,251.9\n"),
        (ExperimentKind::SolenoidAxis, "x (cm),V (mV)\n0,334.6\n1,300\n2,100\n"),
        (ExperimentKind::SurfaceTension, "m2,m3,l\n3.12,2.84,3.0\n3.13,2.85,3.0\n"),
    ];
    for (kind, content) in cases {
        let sub = dir.path().join(kind.key());
        std::fs::create_dir_all(&sub).unwrap();
        let path = write(&sub, "data.csv", content);
        let report = experiments::run(kind, &path).unwrap();
        assert!(report.figure().is_some(), "{kind} has no figure");
        assert!(!report.to_string().is_empty());
    }
}
