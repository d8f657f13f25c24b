mod bootstrap;

use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use rsyncstat_core::error::{AnalyzerError, Result};
use rsyncstat_core::formatting::random_salt;
use rsyncstat_core::settings::Settings;
use rsyncstat_data::aggregator::StreamAggregator;
use rsyncstat_data::report::{self, ReportConfig};

fn main() -> ExitCode {
    let settings = Settings::parse();

    if let Err(e) = bootstrap::setup_logging(&settings.log_level) {
        eprintln!("{e}");
        return ExitCode::from(1);
    }

    let interrupt = match bootstrap::interrupt_flag() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(1);
        }
    };

    tracing::info!("rsyncstat v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings, &interrupt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// The whole pipeline: open input, aggregate to completion, render, print.
///
/// Either a full report reaches stdout or none does; every failure shape
/// surfaces as an [`AnalyzerError`] whose exit code `main` passes through.
fn run(settings: &Settings, interrupt: &AtomicBool) -> Result<()> {
    let config = ReportConfig::from_settings(settings, random_salt())?;

    if !settings.short {
        println!(
            "rsyncstat v{} - rsync daemon log analyzer",
            env!("CARGO_PKG_VERSION")
        );
        match &settings.logfile {
            Some(path) => println!("Reading from {}", path.display()),
            None => println!("Reading from stdin"),
        }
    }

    let aggregator = StreamAggregator::new();
    let stats = match &settings.logfile {
        Some(path) => {
            let file = File::open(path).map_err(|source| AnalyzerError::FileRead {
                path: path.clone(),
                source,
            })?;
            aggregator.consume(BufReader::new(file), interrupt)?
        }
        None => aggregator.consume(std::io::stdin().lock(), interrupt)?,
    };

    tracing::debug!(
        "{} lines, {} sessions, {} bytes total",
        stats.line_count,
        stats.total_sessions,
        stats.total_traffic
    );

    print!("{}", report::render(&stats, &config));
    Ok(())
}
