use chrono::{SecondsFormat, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::TesterError;
use crate::runner::{CaseReport, RunSummary};

pub const SUCCESS_LINE: &str = "All tests executed successfully!";
pub const FAILURE_LINE: &str = "Some tests FAILED! Overall result is FAIL!";

/// Print the overall verdict followed by the time taken.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_console_summary<W: Write + ?Sized>(
    out: &mut W,
    summary: &RunSummary,
) -> io::Result<()> {
    if summary.all_passed() {
        writeln!(out, "{}", SUCCESS_LINE.green().bold())?;
    } else {
        writeln!(out, "{}", FAILURE_LINE.red().bold())?;
    }
    writeln!(
        out,
        "Time taken: {:.6} seconds",
        summary.elapsed.as_secs_f64()
    )?;
    out.flush()
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub demoset: &'a str,
    pub psydoom_path: &'a Path,
    pub demos_dir: &'a Path,
    pub generated_at: String,
    pub passed: bool,
    pub total: usize,
    pub passed_count: usize,
    pub failed_count: usize,
    #[serde(rename = "elapsed_ms", with = "duration_serde")]
    pub elapsed: Duration,
    pub cases: &'a [CaseReport],
}

impl<'a> JsonReport<'a> {
    #[must_use]
    pub fn new(
        demoset: &'a str,
        psydoom_path: &'a Path,
        demos_dir: &'a Path,
        summary: &'a RunSummary,
    ) -> Self {
        Self {
            demoset,
            psydoom_path,
            demos_dir,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            passed: summary.all_passed(),
            total: summary.cases.len(),
            passed_count: summary.passed_count(),
            failed_count: summary.failed_count(),
            elapsed: summary.elapsed,
            cases: &summary.cases,
        }
    }
}

/// Write `report` as pretty JSON to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`TesterError::Report`] if the file cannot be created or written.
pub fn write_json_report(path: &Path, report: &JsonReport<'_>) -> Result<(), TesterError> {
    let to_report_error = |source: io::Error| TesterError::Report {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(to_report_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|err| to_report_error(io::Error::from(err)))?;
    writeln!(writer).map_err(to_report_error)?;
    writer.flush().map_err(to_report_error)
}

pub(crate) mod duration_serde {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }
}
