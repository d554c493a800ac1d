pub mod cli_error;
pub mod config_error;
pub mod corpus_error;
pub mod harness_error;
pub mod triage_error;

pub use cli_error::CliError;
pub use config_error::ConfigError;
pub use corpus_error::CorpusError;
pub use harness_error::HarnessError;
pub use triage_error::TriageError;
