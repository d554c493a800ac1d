use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTask {
    /// Category path label, e.g. `repaired/original_policy`.
    pub category: String,
    pub path: PathBuf,
}

/// What one checker invocation produced. `exit_code` is `None` when the
/// process died without a status or could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerOutput {
    pub exit_code: Option<i32>,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub category: String,
    pub path: PathBuf,
    pub timed_out: bool,
    pub exit_code: Option<i32>,
    pub raw_output: Option<String>,
}

impl CheckResult {
    pub fn finished(task: CheckTask, output: CheckerOutput) -> Self {
        Self {
            category: task.category,
            path: task.path,
            timed_out: false,
            exit_code: output.exit_code,
            raw_output: Some(output.output),
        }
    }

    pub fn timed_out(task: CheckTask) -> Self {
        Self {
            category: task.category,
            path: task.path,
            timed_out: true,
            exit_code: None,
            raw_output: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Places the result in exactly one bucket.
    pub fn classify(&self, sat_marker: &str) -> Outcome {
        if self.timed_out {
            return Outcome::Timeout;
        }
        if self.exit_code != Some(0) {
            return Outcome::Error;
        }
        let output = self.raw_output.as_deref().unwrap_or("").trim();
        if output.contains(sat_marker) {
            Outcome::Sat
        } else {
            Outcome::Unsat
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Sat,
    Unsat,
    Error,
    Timeout,
}

impl Outcome {
    /// Everything but `Sat` is echoed while a run is in progress.
    pub fn is_noteworthy(self) -> bool {
        self != Outcome::Sat
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Sat => "SAT",
            Outcome::Unsat => "UNSAT",
            Outcome::Error => "ERROR",
            Outcome::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
