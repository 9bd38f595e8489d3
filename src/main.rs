use std::path::PathBuf;
use std::process::ExitCode;

use lab_reduce::experiments::{self, ExperimentKind};

const DEFAULT_DATA_FILE: &str = "data.csv";

fn usage() -> String {
    let mut text = String::from("usage: lab-reduce <experiment> [data.csv]\n\nexperiments:\n");
    for kind in ExperimentKind::ALL {
        text.push_str(&format!("  {:<18} {}\n", kind.key(), kind.description()));
    }
    text
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next().map(|arg| arg.parse::<ExperimentKind>()) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => {
            eprintln!("{e}\n\n{}", usage());
            return ExitCode::from(2);
        }
        None => {
            eprintln!("{}", usage());
            return ExitCode::from(2);
        }
    };
    let data_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    let report = match experiments::run(kind, &data_path) {
        Ok(report) => report,
        Err(e) => {
            log::error!("{kind} aborted: {e:#}");
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let text = report.to_string();
    println!("{text}");

    match report.figure() {
        Some(figure) => {
            if let Err(e) = lab_reduce::ui::show_figure(figure, text) {
                log::warn!("{e:#}");
            }
        }
        None => log::warn!("Nothing to plot for {kind}"),
    }
    ExitCode::SUCCESS
}
