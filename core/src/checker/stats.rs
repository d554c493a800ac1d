use std::fmt;
use std::path::{Path, PathBuf};

use super::types::{CheckResult, Outcome};

/// Per-category tally. `total` is fixed when the run is planned; the four
/// buckets fill as results arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub label: String,
    pub total: usize,
    pub sat: Vec<PathBuf>,
    pub unsat: Vec<PathBuf>,
    pub errors: Vec<PathBuf>,
    pub timeouts: Vec<PathBuf>,
}

impl CategoryStats {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn completed(&self) -> usize {
        self.sat.len() + self.unsat.len() + self.errors.len() + self.timeouts.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed() == self.total
    }

    pub fn record(&mut self, path: &Path, outcome: Outcome) {
        let bucket = match outcome {
            Outcome::Sat => &mut self.sat,
            Outcome::Unsat => &mut self.unsat,
            Outcome::Error => &mut self.errors,
            Outcome::Timeout => &mut self.timeouts,
        };
        bucket.push(path.to_path_buf());
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Sat => self.sat.len(),
            Outcome::Unsat => self.unsat.len(),
            Outcome::Error => self.errors.len(),
            Outcome::Timeout => self.timeouts.len(),
        }
    }
}

/// Aggregate over all categories, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    categories: Vec<CategoryStats>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, label: &str, total: usize) {
        match self.get_mut(label) {
            Some(stats) => stats.total += total,
            None => {
                let mut stats = CategoryStats::new(label);
                stats.total = total;
                self.categories.push(stats);
            }
        }
    }

    pub fn record(&mut self, result: &CheckResult, outcome: Outcome) {
        match self.get_mut(&result.category) {
            Some(stats) => stats.record(&result.path, outcome),
            None => tracing::warn!(
                target: "polsift.checker",
                category = %result.category,
                "result for unplanned category"
            ),
        }
    }

    pub fn get(&self, label: &str) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.label == label)
    }

    fn get_mut(&mut self, label: &str) -> Option<&mut CategoryStats> {
        self.categories.iter_mut().find(|c| c.label == label)
    }

    pub fn categories(&self) -> &[CategoryStats] {
        &self.categories
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.total).sum()
    }

    pub fn completed(&self) -> usize {
        self.categories.iter().map(CategoryStats::completed).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.categories.iter().all(CategoryStats::is_complete)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.categories.iter().map(|c| c.count(outcome)).sum()
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, heading: &str, paths: &[PathBuf]) -> fmt::Result {
    if paths.is_empty() {
        return Ok(());
    }
    writeln!(f, "    {heading}:")?;
    for path in paths {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        writeln!(f, "      {name}")?;
    }
    Ok(())
}

impl fmt::Display for CategoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        writeln!(f, "  Total checked: {}", self.total)?;
        writeln!(f, "    SAT:       {}", self.sat.len())?;
        writeln!(f, "    UNSAT:     {}", self.unsat.len())?;
        writeln!(f, "    Errors:    {}", self.errors.len())?;
        writeln!(f, "    Timeouts:  {}", self.timeouts.len())?;
        write_names(f, "UNSAT files", &self.unsat)?;
        write_names(f, "Errored files", &self.errors)?;
        write_names(f, "Timed-out files", &self.timeouts)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, category) in self.categories.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{category}")?;
        }
        Ok(())
    }
}
