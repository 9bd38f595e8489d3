//! Write one sample `data.csv` per experiment under `sample_data/<experiment>/`.
//!
//! The solenoid tables are real bench readings; the other data sets are
//! synthesised from textbook constants with a small deterministic wobble.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lab_reduce::experiments::viscosity;
use lab_reduce::experiments::ExperimentKind;
use lab_reduce::units::Centimeters;

/// Deterministic measurement wobble in `[-amplitude, amplitude]`.
fn wobble(i: usize, amplitude: f64) -> f64 {
    amplitude * ((i as f64 + 1.0) * 12.9898).sin()
}

fn write_table(dir: &Path, kind: ExperimentKind, headers: &[String], rows: &[Vec<String>]) -> Result<PathBuf> {
    let dir = dir.join(kind.key());
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("data.csv");
    let mut writer = csv::Writer::from_path(&path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn photoelectric() -> (Vec<String>, Vec<Vec<String>>) {
    // (label, stopping voltage, current exponent, saturation current)
    let lines = [
        ("365nm", 1.8, -12, 42.0),
        ("405nm", 1.6, -12, 30.0),
        ("436nm", 1.5, -12, 55.0),
        ("546nm", 0.8, -13, 60.0),
        ("577nm", 0.7, -13, 20.0),
    ];
    let mut headers = Vec::new();
    for (label, _, exp, _) in &lines {
        headers.push(format!("U(V) {label}"));
        headers.push(format!("I (10^{exp} A) {label}"));
    }
    let rows = (0..16)
        .map(|step| {
            let u = -2.0 + 2.0 * step as f64;
            let mut row = Vec::new();
            for (j, (_, ua, _, sat)) in lines.iter().enumerate() {
                let drive = (u + ua).max(0.0);
                let i = sat * (1.0 - (-drive / 6.0).exp()) + wobble(step * 5 + j, 0.2);
                row.push(format!("{u:.1}"));
                row.push(format!("{:.2}", i.max(0.0)));
            }
            row
        })
        .collect();
    (headers, rows)
}

fn viscosity_data() -> (Vec<String>, Vec<Vec<String>>) {
    let params = viscosity::Params::default();
    let eta = 8.2; // g/(cm·s), castor oil near 20 °C
    let marks = 6;
    let mut headers = Vec::new();
    let mut columns: Vec<Vec<String>> = Vec::new();
    for ball in &params.balls {
        let d = Centimeters::from(ball.diameter).value();
        let wall = 1.0 + 2.4 * d / params.column_diameter.value();
        let depth = 1.0 + 1.7 * d / params.column_height.value();
        let v = d * d * params.gravity * (params.ball_density - params.fluid_density) / (18.0 * eta * wall * depth);
        for drop in 1..=3 {
            headers.push(format!("{}{drop}", ball.label));
            // The last drop of each ball misses the final mark.
            let n = if drop == 3 { marks - 1 } else { marks };
            let column = (1..=n)
                .map(|i| {
                    let t = params.mark_spacing.value() * i as f64 / v + wobble(i * drop + headers.len(), 0.05);
                    format!("{t:.2}")
                })
                .collect();
            columns.push(column);
        }
    }
    let rows = (0..marks)
        .map(|i| columns.iter().map(|c| c.get(i).cloned().unwrap_or_default()).collect())
        .collect();
    (headers, rows)
}

fn heat_capacity() -> (Vec<String>, Vec<Vec<String>>) {
    let headers = strings(&["Condition", "Trial", "P1_mV", "P2_mV"]);
    let mut rows = Vec::new();
    for (c, condition) in ["fast release", "slow release"].iter().enumerate() {
        for trial in 1..=5 {
            let p1 = 42.0 + wobble(trial + 10 * c, 3.0);
            let p2 = p1 * (0.27 + 0.03 * c as f64) + wobble(trial * 3 + c, 0.4);
            rows.push(vec![
                condition.to_string(),
                trial.to_string(),
                format!("{p1:.1}"),
                format!("{p2:.1}"),
            ]);
        }
    }
    (headers, rows)
}

fn solenoid_current() -> (Vec<String>, Vec<Vec<String>>) {
    let headers = strings(&["I (mA)", "V (mV) 4000Hz", "V (mV) 2000Hz", "V (mV) 1000Hz"]);
    let current = [10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0];
    // The 4000 Hz series saturated the meter above 30 mA.
    let v_4000 = [Some(334.9), Some(500.2), Some(668.9), Some(835.2), Some(1002.3), None, None];
    let v_2000 = [168.03, 251.6, 334.8, 418.2, 502.1, 585.1, 668.8];
    let v_1000 = [84.69, 126.31, 168.3, 210.1, 251.9, 293.1, 335.4];
    let rows = (0..current.len())
        .map(|i| {
            vec![
                current[i].to_string(),
                v_4000[i].map(|v| v.to_string()).unwrap_or_default(),
                v_2000[i].to_string(),
                v_1000[i].to_string(),
            ]
        })
        .collect();
    (headers, rows)
}

fn solenoid_axis() -> (Vec<String>, Vec<Vec<String>>) {
    let headers = strings(&["x (cm)", "V (mV)"]);
    let voltage = [
        334.6, 335.1, 334.9, 334.8, 334.9, 334.4, 334.1, 333.5, 333.0, 332.2, 331.5, 329.8, 327.4, 322.7,
        313.6, 290.3, 241.6, 178.6, 180.0, 116.5, 59.57, 10.72,
    ];
    let rows = voltage
        .iter()
        .enumerate()
        .map(|(x, v)| vec![x.to_string(), v.to_string()])
        .collect();
    (headers, rows)
}

fn surface_tension() -> (Vec<String>, Vec<Vec<String>>) {
    let headers = strings(&["m2 (g)", "m3 (g)", "l (cm)"]);
    let rows = (0..6)
        .map(|i| {
            let m3 = 2.8400 + wobble(i, 0.002);
            let dm = 0.2740 + wobble(i + 7, 0.004);
            vec![
                format!("{:.4}", m3 + dm),
                format!("{m3:.4}"),
                format!("{:.3}", 3.002 + wobble(i + 3, 0.004)),
            ]
        })
        .collect();
    (headers, rows)
}

fn main() -> Result<()> {
    env_logger::init();
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));

    for kind in ExperimentKind::ALL {
        let (headers, rows) = match kind {
            ExperimentKind::Photoelectric => photoelectric(),
            ExperimentKind::Viscosity => viscosity_data(),
            ExperimentKind::HeatCapacity => heat_capacity(),
            ExperimentKind::SolenoidCurrent => solenoid_current(),
            ExperimentKind::SolenoidAxis => solenoid_axis(),
            ExperimentKind::SurfaceTension => surface_tension(),
        };
        let path = write_table(&out_dir, kind, &headers, &rows)?;
        println!("Wrote {} rows for {kind} to {}", rows.len(), path.display());
    }
    Ok(())
}
