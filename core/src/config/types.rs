use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::extract::AcceptancePolicy;
use crate::validate::{RepairOptions, StatementSynthesis};

/// Category paths the harness walks, in submission order.
pub const DEFAULT_CHECK_CATEGORIES: [&str; 4] = [
    "repaired/original_policy",
    "repaired/results",
    "relaxed/original_policy",
    "broken/original_policy",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub checker: CheckerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checker.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "checker.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.checker.workers == Some(0) {
            return Err(ConfigError::Validation(
                "checker.workers must be at least 1".into(),
            ));
        }
        if self.repair.sid_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "repair.sid_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn repair_options(&self) -> RepairOptions {
        RepairOptions {
            sid_prefix: self.repair.sid_prefix.clone(),
            synthesis: self.repair.statement_synthesis,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_saved_root")]
    pub saved_root: PathBuf,

    #[serde(default = "default_filtered_root")]
    pub filtered_root: PathBuf,

    #[serde(default = "default_quarantine_root")]
    pub quarantine_root: PathBuf,

    /// Persisted source-folder to (category, index) map written by triage.
    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,
}

fn default_saved_root() -> PathBuf {
    PathBuf::from("saved_pages")
}

fn default_filtered_root() -> PathBuf {
    PathBuf::from("filtered_pages")
}

fn default_quarantine_root() -> PathBuf {
    PathBuf::from("quarantined_pages")
}

fn default_index_file() -> PathBuf {
    PathBuf::from("triage_index.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            saved_root: default_saved_root(),
            filtered_root: default_filtered_root(),
            quarantine_root: default_quarantine_root(),
            index_file: default_index_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_acceptance")]
    pub acceptance: AcceptancePolicy,

    #[serde(default = "default_relaxed_acceptance")]
    pub relaxed_acceptance: AcceptancePolicy,
}

fn default_acceptance() -> AcceptancePolicy {
    AcceptancePolicy::Shape
}

fn default_relaxed_acceptance() -> AcceptancePolicy {
    AcceptancePolicy::Loose
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            acceptance: default_acceptance(),
            relaxed_acceptance: default_relaxed_acceptance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    #[serde(default = "default_sid_prefix")]
    pub sid_prefix: String,

    #[serde(default)]
    pub statement_synthesis: StatementSynthesis,
}

fn default_sid_prefix() -> String {
    "policy_".to_string()
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            sid_prefix: default_sid_prefix(),
            statement_synthesis: StatementSynthesis::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    #[serde(default = "default_checker_program")]
    pub program: String,

    #[serde(default = "default_checker_args")]
    pub args: Vec<String>,

    #[serde(default = "default_checker_workdir")]
    pub workdir: PathBuf,

    #[serde(default = "default_bound")]
    pub bound: u32,

    #[serde(default = "default_checker_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_sat_marker")]
    pub sat_marker: String,

    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_checker_program() -> String {
    "python3".to_string()
}

fn default_checker_args() -> Vec<String> {
    vec!["quacky.py".to_string()]
}

fn default_checker_workdir() -> PathBuf {
    PathBuf::from("src")
}

fn default_bound() -> u32 {
    100
}

fn default_checker_timeout_secs() -> u64 {
    30
}

fn default_sat_marker() -> String {
    "satisfiability: sat".to_string()
}

fn default_log_path() -> PathBuf {
    PathBuf::from("check_policies.log")
}

fn default_categories() -> Vec<String> {
    DEFAULT_CHECK_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

impl CheckerConfig {
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            program: default_checker_program(),
            args: default_checker_args(),
            workdir: default_checker_workdir(),
            bound: default_bound(),
            timeout_secs: default_checker_timeout_secs(),
            sat_marker: default_sat_marker(),
            workers: None,
            log_path: default_log_path(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Diagnostic log file; stderr when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}
