use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the tester itself, as opposed to demos that fail their check.
#[derive(Debug, Error)]
pub enum TesterError {
    #[error("Invalid demoset '{name}'! Available demo sets: {}", .available.join(", "))]
    UnknownDemoSet {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("could not launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write report to {}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
