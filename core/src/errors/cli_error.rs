// core/src/errors/cli_error.rs
use thiserror::Error;

use super::{ConfigError, CorpusError, HarnessError, TriageError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Triage(#[from] TriageError),

    #[error(transparent)]
    Harness(#[from] HarnessError),

    #[error("{0}")]
    Usage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
