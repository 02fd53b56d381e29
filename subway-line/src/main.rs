use std::process::ExitCode;

use subway_line::line::{LineConfig, LineRegistry};
use subway_line::script::{Outcome, Script};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(script_path) = std::env::args().nth(1) else {
        eprintln!("Usage: subway-line <script.json>");
        return ExitCode::FAILURE;
    };

    let script = match Script::load(&script_path) {
        Ok(script) => script,
        Err(e) => {
            error!(path = %script_path, error = %e, "Failed to load script");
            return ExitCode::FAILURE;
        }
    };

    let config = LineConfig::from_env();
    println!("Removal policy: {:?}", config.removal_policy);
    let registry = LineRegistry::new(config);

    let (reports, lines) = match script.run(&registry).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Script aborted");
            return ExitCode::FAILURE;
        }
    };

    for report in &reports {
        match &report.result {
            Ok(Outcome::Created(id)) => {
                println!("{:>3}. [{}] created as {}", report.step, report.line, id)
            }
            Ok(Outcome::Added(placement)) => {
                println!("{:>3}. [{}] section added ({:?})", report.step, report.line, placement)
            }
            Ok(Outcome::Removed) => {
                println!("{:>3}. [{}] station removed", report.step, report.line)
            }
            Ok(Outcome::Stations(stations)) => {
                let names: Vec<&str> = stations.iter().map(|s| s.as_str()).collect();
                println!("{:>3}. [{}] {}", report.step, report.line, names.join(" -> "));
            }
            Err(e) => println!("{:>3}. [{}] rejected: {}", report.step, report.line, e),
        }
    }

    println!();
    let mut names: Vec<(&String, _)> = lines.iter().collect();
    names.sort_by_key(|(_, id)| **id);
    for (name, id) in names {
        match registry.stations(*id).await {
            Ok(stations) => {
                let stations: Vec<&str> = stations.iter().map(|s| s.as_str()).collect();
                println!("{}: {}", name, stations.join(" -> "));
            }
            Err(e) => error!(line = %id, error = %e, "Failed to list stations"),
        }
    }

    ExitCode::SUCCESS
}
