use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::errors::HarnessError;

use super::types::CheckResult;

/// Append-only, human-readable log of one or more check runs.
///
/// Only the harness coordinator writes to it, one whole record at a time,
/// and every record is flushed before the next result is taken.
pub struct CheckLog {
    path: PathBuf,
    file: File,
}

impl CheckLog {
    pub async fn open(path: &Path) -> Result<Self, HarnessError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| HarnessError::Log {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|source| HarnessError::Log {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn header(&mut self, run_id: &str) -> Result<(), HarnessError> {
        let line = format!("=== check run {run_id} at {} ===\n\n", Utc::now().to_rfc3339());
        self.write(&line).await
    }

    pub async fn record(&mut self, result: &CheckResult, timeout_secs: u64) -> Result<(), HarnessError> {
        self.write(&format_record(result, timeout_secs)).await
    }

    pub async fn footer(&mut self, interrupted: bool) -> Result<(), HarnessError> {
        let line = if interrupted {
            "=== run interrupted ===\n"
        } else {
            "=== end of run ===\n"
        };
        self.write(line).await
    }

    async fn write(&mut self, text: &str) -> Result<(), HarnessError> {
        let written = match self.file.write_all(text.as_bytes()).await {
            Ok(()) => self.file.flush().await,
            Err(e) => Err(e),
        };
        written.map_err(|source| HarnessError::Log {
            path: self.path.clone(),
            source,
        })
    }
}

/// One log record: a `--- [category] name ---` line, then either the timeout
/// marker or the trimmed checker output, then a blank line.
pub fn format_record(result: &CheckResult, timeout_secs: u64) -> String {
    let mut out = format!("--- [{}] {} ---\n", result.category, result.file_name());
    if result.timed_out {
        out.push_str(&format!("[TIMEOUT >{timeout_secs}s]\n\n"));
    } else {
        out.push_str(result.raw_output.as_deref().unwrap_or("").trim());
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::types::{CheckTask, CheckerOutput};

    fn task() -> CheckTask {
        CheckTask {
            category: "relaxed/original_policy".to_string(),
            path: PathBuf::from("relaxed/original_policy/4.json"),
        }
    }

    #[test]
    fn timeout_record() {
        let rec = format_record(&CheckResult::timed_out(task()), 300);
        assert_eq!(rec, "--- [relaxed/original_policy] 4.json ---\n[TIMEOUT >300s]\n\n");
    }

    #[test]
    fn output_record_is_trimmed() {
        let result = CheckResult::finished(
            task(),
            CheckerOutput {
                exit_code: Some(0),
                output: "\n  satisfiability: sat \n\n".to_string(),
            },
        );
        assert_eq!(
            format_record(&result, 300),
            "--- [relaxed/original_policy] 4.json ---\nsatisfiability: sat\n\n"
        );
    }

    #[tokio::test]
    async fn runs_append_to_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("check.log");

        for _ in 0..2 {
            let mut log = CheckLog::open(&path).await.unwrap();
            log.header("run").await.unwrap();
            log.record(&CheckResult::timed_out(task()), 5).await.unwrap();
            log.footer(false).await.unwrap();
        }

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("=== check run run at ").count(), 2);
        assert_eq!(text.matches("=== end of run ===").count(), 2);
        assert!(text.starts_with("=== check run run at "));
    }
}
