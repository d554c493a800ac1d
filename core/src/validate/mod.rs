//! Structural checks, idempotent repairs, and the corpus sweep that applies
//! them together with the quarantine gate.

mod detect;
mod repair;
mod selection;
mod sweep;

pub use detect::{detect, detect_file, detect_source, Issue};
pub use repair::{repair, repair_file, RepairOptions, RepairOutcome, StatementSynthesis};
pub use selection::{CheckSet, RepairSet, UnknownToken};
pub use sweep::{collect_documents, sweep, FlaggedFile, SweepOptions, SweepReport};
