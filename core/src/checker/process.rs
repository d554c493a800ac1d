use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::CheckerConfig;
use crate::errors::HarnessError;

use super::types::CheckerOutput;

/// Anything that can decide one policy file.
///
/// Implementations must be cancel-safe: the harness drops the future when
/// the per-task timeout elapses or the run is interrupted.
#[async_trait]
pub trait PolicyChecker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, policy: &Path) -> CheckerOutput;
}

/// Runs the external checker as a child process per policy:
/// `<program> <args..> -p1 <abs path> -b <bound>` inside `workdir`.
#[derive(Debug, Clone)]
pub struct ProcessChecker {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
    bound: u32,
}

impl ProcessChecker {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        workdir: impl Into<PathBuf>,
        bound: u32,
    ) -> Result<Self, HarnessError> {
        let workdir = workdir.into();
        if !workdir.is_dir() {
            return Err(HarnessError::WorkdirMissing(workdir));
        }
        Ok(Self {
            program: program.into(),
            args,
            workdir,
            bound,
        })
    }

    pub fn from_config(cfg: &CheckerConfig) -> Result<Self, HarnessError> {
        Self::new(
            cfg.program.clone(),
            cfg.args.clone(),
            cfg.workdir.clone(),
            cfg.bound,
        )
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn command(&self, policy: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("-p1")
            .arg(absolute(policy))
            .arg("-b")
            .arg(self.bound.to_string())
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PolicyChecker for ProcessChecker {
    fn name(&self) -> &str {
        &self.program
    }

    async fn check(&self, policy: &Path) -> CheckerOutput {
        match self.command(policy).output().await {
            Ok(out) => {
                let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
                output.push_str(&String::from_utf8_lossy(&out.stderr));
                CheckerOutput {
                    exit_code: out.status.code(),
                    output,
                }
            }
            Err(e) => {
                tracing::warn!(
                    target: "polsift.checker",
                    program = %self.program,
                    policy = %policy.display(),
                    error = %e,
                    "checker failed to start"
                );
                CheckerOutput {
                    exit_code: None,
                    output: format!("failed to start {}: {e}", self.program),
                }
            }
        }
    }
}

// The checker runs in its own workdir, so relative corpus paths must be
// resolved against ours first.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_workdir_is_rejected() {
        let err = ProcessChecker::new("z3", vec![], "/definitely/not/here", 100).unwrap_err();
        assert!(matches!(err, HarnessError::WorkdirMissing(_)));
    }

    #[test]
    fn command_line_carries_policy_and_bound() {
        let dir = tempfile::tempdir().unwrap();
        let checker = ProcessChecker::new(
            "python3",
            vec!["-m".into(), "checker".into()],
            dir.path(),
            100,
        )
        .unwrap();
        let policy = dir.path().join("7.json");
        let cmd = checker.command(&policy);
        let std_cmd = cmd.as_std();
        let args: Vec<String> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(std_cmd.get_program(), "python3");
        assert_eq!(
            args,
            vec![
                "-m".to_string(),
                "checker".to_string(),
                "-p1".to_string(),
                policy.display().to_string(),
                "-b".to_string(),
                "100".to_string(),
            ]
        );
        assert_eq!(std_cmd.get_current_dir(), Some(dir.path()));
    }

    #[tokio::test]
    async fn spawn_failure_is_reported_as_output() {
        let dir = tempfile::tempdir().unwrap();
        let checker =
            ProcessChecker::new("polsift-no-such-binary", vec![], dir.path(), 10).unwrap();
        let out = checker.check(&dir.path().join("0.json")).await;
        assert_eq!(out.exit_code, None);
        assert!(out.output.contains("failed to start"));
    }
}
