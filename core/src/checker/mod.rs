//! Concurrent submission of corpus policies to the external satisfiability
//! checker.
//!
//! Workers only run the checker and send results over a channel; the single
//! coordinating loop in [`Harness::run`] owns the log writer and all
//! aggregate counters.

mod harness;
mod log;
mod process;
mod stats;
mod types;

pub use harness::{Harness, HarnessEvent, HarnessOptions, HarnessReport};
pub use log::{format_record, CheckLog};
pub use process::{PolicyChecker, ProcessChecker};
pub use stats::{CategoryStats, RunStats};
pub use types::{CheckResult, CheckTask, CheckerOutput, Outcome};
