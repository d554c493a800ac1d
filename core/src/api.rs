//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `polsift_core::api` instead of reaching into internal modules.

pub use crate::checker::{
    CheckResult, CheckTask, CheckerOutput, Harness, HarnessEvent, HarnessOptions, HarnessReport,
    Outcome, PolicyChecker, ProcessChecker, RunStats,
};
pub use crate::config::{load as load_config, AppConfig, CheckerConfig, LoggingConfig};
pub use crate::errors::{CliError, ConfigError, CorpusError, HarnessError, TriageError};
pub use crate::extract::{extract_policy_block, AcceptancePolicy, Extraction};
pub use crate::quarantine::{Quarantine, QuarantineRecord};
pub use crate::triage::{run_passes, Category, IndexMap, PassReport, Role, TriageContext, TriagePass};
pub use crate::validate::{
    detect_file, repair_file, sweep, CheckSet, Issue, RepairOptions, RepairSet, StatementSynthesis,
    SweepOptions, SweepReport,
};
