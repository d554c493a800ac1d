use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::errors::CorpusError;
use crate::quarantine::{Quarantine, QuarantineRecord};

use super::{detect_file, repair_file, CheckSet, Issue, RepairOptions, RepairOutcome, RepairSet};

/// Directory name excluded from sweeps; intent files carry prose, not policies.
const INTENT_DIR: &str = "intent";

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    pub checks: Option<CheckSet>,
    pub repairs: Option<RepairSet>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedFile {
    pub path: PathBuf,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub scanned: usize,
    pub flagged: Vec<FlaggedFile>,
    pub repaired: usize,
    pub unrepairable: usize,
    pub quarantined: Vec<QuarantineRecord>,
    /// Files a repair write or quarantine move failed on, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

/// Lists every `*.json` document under `root`, outside `intent`
/// directories, in sorted order.
pub fn collect_documents(root: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    if !root.is_dir() {
        tracing::warn!(
            target: "polsift.validate",
            root = %root.display(),
            "sweep root does not exist"
        );
        return Ok(Vec::new());
    }

    let escaped = Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{escaped}/**/*.json");
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut out = Vec::new();
    for entry in glob::glob_with(&pattern, options).map_err(|e| CorpusError::Pattern(e.to_string()))? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(target: "polsift.validate", error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !path.is_file() || in_intent_dir(root, &path) {
            continue;
        }
        out.push(path);
    }
    out.sort();
    Ok(out)
}

fn in_intent_dir(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let Some(parent) = rel.parent() else {
        return false;
    };
    parent.components().any(|c| match c {
        Component::Normal(s) => s.to_string_lossy().eq_ignore_ascii_case(INTENT_DIR),
        _ => false,
    })
}

/// Detects, repairs and quarantines every document under `root` as
/// selected by `opts`. Per-file failures are recorded, never fatal.
pub fn sweep(
    root: &Path,
    opts: &SweepOptions,
    repair_opts: &RepairOptions,
    quarantine: &Quarantine,
) -> Result<SweepReport, CorpusError> {
    let mut report = SweepReport::default();
    let repairs = opts.repairs.unwrap_or_default();

    if repairs.empty_statement && !repair_opts.removes_empty_statement(&repairs) {
        tracing::warn!(
            target: "polsift.validate",
            "empty-stmt repair needs wrap_bare_statement synthesis; ignoring it"
        );
    }

    for path in collect_documents(root)? {
        // An earlier quarantine may have taken this file as a sibling.
        if !path.exists() {
            continue;
        }
        report.scanned += 1;

        if let Some(checks) = &opts.checks {
            let issues = detect_file(&path, checks);
            if !issues.is_empty() {
                report.flagged.push(FlaggedFile {
                    path: path.clone(),
                    issues,
                });
            }
        }

        if repairs.rewrites() {
            match repair_file(&path, &repairs, repair_opts) {
                Ok(RepairOutcome::Repaired) => report.repaired += 1,
                Ok(RepairOutcome::NotRepairable) => report.unrepairable += 1,
                Ok(RepairOutcome::Unchanged) => {}
                Err(e) => {
                    tracing::warn!(
                        target: "polsift.validate",
                        path = %path.display(),
                        error = %e,
                        "repair write failed"
                    );
                    report.failures.push((path.clone(), e.to_string()));
                }
            }
        }

        if repairs.quarantine {
            let gate = detect_file(&path, &CheckSet::required_fields());
            if !gate.iter().any(Issue::is_missing_required) {
                continue;
            }
            match quarantine.quarantine(&path) {
                Ok(record) => report.quarantined.push(record),
                Err(e) => {
                    tracing::warn!(
                        target: "polsift.quarantine",
                        path = %path.display(),
                        error = %e,
                        "quarantine failed"
                    );
                    report.failures.push((path.clone(), e.to_string()));
                }
            }
        }
    }

    tracing::info!(
        target: "polsift.validate",
        scanned = report.scanned,
        flagged = report.flagged.len(),
        repaired = report.repaired,
        quarantined = report.quarantined.len(),
        "sweep finished"
    );
    Ok(report)
}
