use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use polsift_core::api::TriagePass;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassSelection {
    All,
    Repaired,
    Broken,
    Relaxed,
}

impl PassSelection {
    pub fn passes(self) -> Vec<TriagePass> {
        match self {
            PassSelection::All => TriagePass::ORDERED.to_vec(),
            PassSelection::Repaired => vec![TriagePass::Repaired],
            PassSelection::Broken => vec![TriagePass::Broken],
            PassSelection::Relaxed => vec![TriagePass::Relaxed],
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "polsift", version, about = "Build and maintain a corpus of access policies harvested from forum posts")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file. Defaults to ./polsift.toml when it exists.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sort saved posts into the repaired, broken and relaxed categories.
    Triage(TriageArgs),
    /// Detect, repair and quarantine malformed policy documents.
    Clean(CleanArgs),
    /// Run the external checker over the corpus.
    Check(CheckArgs),
    /// Pull the first policy block out of a text file.
    Extract(ExtractArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TriageArgs {
    /// Which pass to run. `all` runs repaired, broken, relaxed in that order.
    #[arg(long, value_enum, default_value_t = PassSelection::All)]
    pub pass: PassSelection,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CleanArgs {
    /// Comma-separated checks: all, sid, r, condition, empty-stmt, statement
    #[arg(short = 'd', long = "detect")]
    pub detect: Option<String>,

    /// Comma-separated repairs: all, sid, statement, condition, empty-stmt, quarantine
    #[arg(short = 'r', long = "repair")]
    pub repair: Option<String>,

    /// Sweep this directory instead of the configured filtered root.
    #[arg(long)]
    pub root: Option<PathBuf>,
}

impl CleanArgs {
    pub fn is_empty(&self) -> bool {
        self.detect.is_none() && self.repair.is_none()
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    /// Concurrent checker processes. Defaults to the number of CPUs.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-policy timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Disable the progress bar.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExtractArgs {
    pub file: PathBuf,

    /// Accept any block with Version and Statement, not only policy-shaped ones.
    #[arg(long, default_value_t = false)]
    pub loose: bool,
}
