use colored::Colorize;
use serde::Serialize;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::demosets::{DemoCase, DemoSet};
use crate::error::TesterError;

/// Everything needed to play back one demo case with the game executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoInvocation {
    pub program: PathBuf,
    pub demo_path: PathBuf,
    pub result_path: PathBuf,
}

impl DemoInvocation {
    #[must_use]
    pub fn new(program: &Path, demos_dir: &Path, case: &DemoCase) -> Self {
        Self {
            program: program.to_path_buf(),
            demo_path: demos_dir.join(&case.demo_file),
            result_path: demos_dir.join(&case.result_file),
        }
    }

    /// Arguments passed to the game, in the order it expects them.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        vec![
            OsString::from("-headless"),
            OsString::from("-playdemo"),
            self.demo_path.clone().into_os_string(),
            OsString::from("-checkresult"),
            self.result_path.clone().into_os_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    /// `exit_code` is `None` when the game was terminated by a signal.
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },
    LaunchFailed {
        reason: String,
    },
}

impl CaseOutcome {
    #[must_use]
    pub fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            Self::Passed
        } else {
            Self::Failed {
                exit_code: status.code(),
            }
        }
    }

    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Seam between the runner loop and the external game process.
pub trait DemoLauncher {
    fn launch(&self, invocation: &DemoInvocation) -> CaseOutcome;
}

/// Spawns the real executable and waits for it, discarding all of its output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    fn spawn_and_wait(invocation: &DemoInvocation) -> Result<ExitStatus, TesterError> {
        Command::new(&invocation.program)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| TesterError::Launch {
                program: invocation.program.clone(),
                source,
            })
    }
}

impl DemoLauncher for ProcessLauncher {
    fn launch(&self, invocation: &DemoInvocation) -> CaseOutcome {
        match Self::spawn_and_wait(invocation) {
            Ok(status) => CaseOutcome::from_status(status),
            Err(err) => {
                log::warn!("{err}");
                CaseOutcome::LaunchFailed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub demo: String,
    pub result: String,
    pub demo_path: PathBuf,
    pub result_path: PathBuf,
    #[serde(flatten)]
    pub outcome: CaseOutcome,
    #[serde(rename = "duration_ms", with = "crate::reports::duration_serde")]
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cases: Vec<CaseReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// True when no case failed; an empty run counts as passing.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.outcome.passed())
    }

    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.passed()).count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| !c.outcome.passed())
    }
}

pub struct DemoRunner<'a, L: DemoLauncher> {
    launcher: L,
    program: &'a Path,
    demos_dir: &'a Path,
}

impl<'a, L: DemoLauncher> DemoRunner<'a, L> {
    pub const fn new(launcher: L, program: &'a Path, demos_dir: &'a Path) -> Self {
        Self {
            launcher,
            program,
            demos_dir,
        }
    }

    /// Play every case of `set` in order, one at a time.
    ///
    /// Progress and failure lines go to `out` and are flushed as they are
    /// written. A failing case never stops the run. `started` marks the
    /// beginning of the whole invocation and is used for the elapsed time.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing to `out` fails.
    pub fn run<W: Write + ?Sized>(
        &self,
        set: &DemoSet,
        started: Instant,
        out: &mut W,
    ) -> io::Result<RunSummary> {
        log::info!(
            "running {} demos from set '{}' ({}) with {}",
            set.len(),
            set.name(),
            set.description(),
            self.program.display()
        );
        if set.is_empty() {
            log::warn!("demo set '{}' has no demos", set.name());
        }

        let mut cases = Vec::with_capacity(set.len());
        for case in set.cases() {
            cases.push(self.run_case(case, out)?);
        }

        let summary = RunSummary {
            cases,
            elapsed: started.elapsed(),
        };
        log::info!(
            "finished demo set '{}': {} passed, {} failed",
            set.name(),
            summary.passed_count(),
            summary.failed_count()
        );
        Ok(summary)
    }

    fn run_case<W: Write + ?Sized>(
        &self,
        case: &DemoCase,
        out: &mut W,
    ) -> io::Result<CaseReport> {
        let invocation = DemoInvocation::new(self.program, self.demos_dir, case);

        writeln!(out, "Run demo: {}", invocation.demo_path.display())?;
        out.flush()?;

        log::debug!(
            "launching {} {:?}",
            invocation.program.display(),
            invocation.args()
        );
        let case_start = Instant::now();
        let outcome = self.launcher.launch(&invocation);
        let duration = case_start.elapsed();
        log::debug!("{} -> {outcome:?} in {duration:?}", case.demo_file);

        if let Some(line) = failure_line(&invocation, &outcome) {
            writeln!(out, "{}", line.red())?;
            out.flush()?;
        }

        Ok(CaseReport {
            demo: case.demo_file.clone(),
            result: case.result_file.clone(),
            demo_path: invocation.demo_path,
            result_path: invocation.result_path,
            outcome,
            duration,
        })
    }
}

fn failure_line(invocation: &DemoInvocation, outcome: &CaseOutcome) -> Option<String> {
    match outcome {
        CaseOutcome::Passed => None,
        CaseOutcome::Failed { .. } => Some(format!(
            "    DEMO TEST FAILED!: {}",
            invocation.demo_path.display()
        )),
        CaseOutcome::LaunchFailed { reason } => Some(format!(
            "    DEMO TEST FAILED!: {} ({reason})",
            invocation.demo_path.display()
        )),
    }
}
