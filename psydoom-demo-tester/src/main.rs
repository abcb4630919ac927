mod demosets;
mod error;
mod reports;
mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::stdout;
use std::path::PathBuf;
use std::time::Instant;

use demosets::{DemoSet, demoset_names, get_demoset};
use error::TesterError;
use reports::JsonReport;
use runner::{DemoRunner, ProcessLauncher};

#[derive(Debug, Parser)]
#[command(name = "psydoom-demo-tester", version)]
#[command(
    about = "Plays a set of recorded demos through PsyDoom in headless mode and verifies each result"
)]
struct Args {
    /// Demo set to run (e.g. doom)
    demoset: String,

    /// Path to the PsyDoom executable
    psydoom_path: PathBuf,

    /// Directory holding the demo (.LMP) and expected result (.result.json) files
    demos_dir: PathBuf,

    /// Also write a JSON summary of the run to this path
    #[arg(long, value_name = "PATH")]
    json_report: Option<PathBuf>,
}

fn main() -> Result<()> {
    let start_time = Instant::now();
    env_logger::init();
    let args = Args::parse();

    let demoset = match resolve_demoset(&args.demoset) {
        Ok(set) => set,
        Err(err) => {
            println!("{}", err.to_string().red());
            std::process::exit(1);
        }
    };

    if !run(&args, demoset, start_time)? {
        std::process::exit(1);
    }

    Ok(())
}

fn resolve_demoset(name: &str) -> Result<&'static DemoSet, TesterError> {
    get_demoset(name).ok_or_else(|| TesterError::UnknownDemoSet {
        name: name.to_string(),
        available: demoset_names(),
    })
}

/// Runs every demo in `demoset`, prints the summary and writes the optional
/// JSON report. Returns whether every demo passed.
fn run(args: &Args, demoset: &DemoSet, start_time: Instant) -> Result<bool> {
    let mut out = stdout().lock();
    let runner = DemoRunner::new(ProcessLauncher, &args.psydoom_path, &args.demos_dir);

    let summary = runner
        .run(demoset, start_time, &mut out)
        .context("failed to write demo progress")?;
    reports::write_console_summary(&mut out, &summary)
        .context("failed to write demo summary")?;

    if let Some(path) = &args.json_report {
        let report = JsonReport::new(&args.demoset, &args.psydoom_path, &args.demos_dir, &summary);
        reports::write_json_report(path, &report)?;
        log::info!("wrote JSON report to {}", path.display());
    }

    Ok(summary.all_passed())
}
