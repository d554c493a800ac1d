// core/src/errors/harness_error.rs
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("checker working directory not found: {}", .0.display())]
    WorkdirMissing(PathBuf),

    #[error("failed to write check log {}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no workers available (workers must be >= 1)")]
    NoWorkers,
}
