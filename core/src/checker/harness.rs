use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::HarnessError;

use super::log::CheckLog;
use super::process::PolicyChecker;
use super::stats::RunStats;
use super::types::{CheckResult, CheckTask, Outcome};

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub filtered_root: PathBuf,
    /// Category path labels relative to `filtered_root`, checked in order.
    pub categories: Vec<String>,
    pub workers: usize,
    pub timeout: Duration,
    pub sat_marker: String,
    pub log_path: PathBuf,
}

impl HarnessOptions {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            filtered_root: cfg.paths.filtered_root.clone(),
            categories: cfg.checker.categories.clone(),
            workers: cfg.checker.effective_workers(),
            timeout: Duration::from_secs(cfg.checker.timeout_secs),
            sat_marker: cfg.checker.sat_marker.clone(),
            log_path: cfg.checker.log_path.clone(),
        }
    }
}

/// Progress notifications for whatever front end is driving the run.
/// The harness never renders anything itself.
#[derive(Debug, Clone)]
pub enum HarnessEvent {
    Planned { total: usize },
    Completed { result: CheckResult, outcome: Outcome },
}

#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub run_id: String,
    pub stats: RunStats,
    pub interrupted: bool,
    pub log_path: PathBuf,
}

pub struct Harness {
    opts: HarnessOptions,
    checker: Arc<dyn PolicyChecker>,
    events: Option<mpsc::UnboundedSender<HarnessEvent>>,
}

impl Harness {
    pub fn new(opts: HarnessOptions, checker: Arc<dyn PolicyChecker>) -> Self {
        Self {
            opts,
            checker,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<HarnessEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn options(&self) -> &HarnessOptions {
        &self.opts
    }

    /// Enumerates the `*.json` files of every category, numerically ordered
    /// by stem. A missing category directory is planned with zero files.
    pub async fn plan(&self) -> (Vec<CheckTask>, RunStats) {
        let mut tasks = Vec::new();
        let mut stats = RunStats::new();
        for label in &self.opts.categories {
            let files = category_files(&self.opts.filtered_root.join(label)).await;
            stats.add_category(label, files.len());
            tasks.extend(files.into_iter().map(|path| CheckTask {
                category: label.clone(),
                path,
            }));
        }
        (tasks, stats)
    }

    /// Checks every planned file, at most `workers` at a time.
    ///
    /// Resolving `shutdown` stops the run: no new results are taken, running
    /// checks are abandoned, and the report comes back with `interrupted` set.
    pub async fn run<S>(&self, shutdown: S) -> Result<HarnessReport, HarnessError>
    where
        S: Future<Output = ()>,
    {
        if self.opts.workers == 0 {
            return Err(HarnessError::NoWorkers);
        }

        let (tasks, mut stats) = self.plan().await;
        let run_id = Uuid::new_v4().to_string();
        let mut log = CheckLog::open(&self.opts.log_path).await?;
        log.header(&run_id).await?;

        tracing::info!(
            target: "polsift.checker",
            run_id = %run_id,
            checker = self.checker.name(),
            files = tasks.len(),
            workers = self.opts.workers,
            timeout_secs = self.opts.timeout.as_secs(),
            "check run started"
        );
        self.emit(HarnessEvent::Planned { total: tasks.len() });

        let permits = Arc::new(Semaphore::new(self.opts.workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<CheckResult>();
        let mut workers = JoinSet::new();

        for task in tasks {
            let permits = permits.clone();
            let checker = self.checker.clone();
            let tx = tx.clone();
            let timeout = self.opts.timeout;

            workers.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let result = match tokio::time::timeout(timeout, checker.check(&task.path)).await {
                    Ok(output) => CheckResult::finished(task, output),
                    Err(_) => CheckResult::timed_out(task),
                };
                let _ = tx.send(result);
            });
        }
        drop(tx);

        tokio::pin!(shutdown);
        let mut interrupted = false;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    interrupted = true;
                    break;
                }
                next = rx.recv() => {
                    let Some(result) = next else { break };
                    let outcome = result.classify(&self.opts.sat_marker);
                    log.record(&result, self.opts.timeout.as_secs()).await?;
                    stats.record(&result, outcome);
                    self.emit(HarnessEvent::Completed { result, outcome });
                }
            }
        }

        if interrupted {
            workers.abort_all();
            tracing::warn!(
                target: "polsift.checker",
                run_id = %run_id,
                completed = stats.completed(),
                total = stats.total(),
                "check run interrupted"
            );
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    tracing::error!(target: "polsift.checker", error = %e, "check worker panicked");
                }
            }
        }

        log.footer(interrupted).await?;
        if !interrupted {
            tracing::info!(
                target: "polsift.checker",
                run_id = %run_id,
                sat = stats.count(Outcome::Sat),
                unsat = stats.count(Outcome::Unsat),
                errors = stats.count(Outcome::Error),
                timeouts = stats.count(Outcome::Timeout),
                "check run finished"
            );
        }

        Ok(HarnessReport {
            run_id,
            stats,
            interrupted,
            log_path: log.path().to_path_buf(),
        })
    }

    fn emit(&self, event: HarnessEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

async fn category_files(dir: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(
                target: "polsift.checker",
                dir = %dir.display(),
                error = %e,
                "category directory unavailable, nothing to check"
            );
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(
                    target: "polsift.checker",
                    dir = %dir.display(),
                    error = %e,
                    "stopped listing category directory"
                );
                break;
            }
        };
        let path = entry.path();
        if !path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            continue;
        }
        if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|path| sort_key(path));
    files
}

// Numeric stems first in numeric order, anything else after by name.
fn sort_key(path: &Path) -> (u8, u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.parse::<u64>() {
        Ok(n) => (0, n, stem),
        Err(_) => (1, 0, stem),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::CheckerOutput;
    use async_trait::async_trait;
    use std::fs;

    /// Decides by file stem. Even is sat, odd is unsat, 13 exits non-zero
    /// and 99 never finishes in time.
    struct ParityChecker;

    #[async_trait]
    impl PolicyChecker for ParityChecker {
        fn name(&self) -> &str {
            "parity"
        }

        async fn check(&self, policy: &Path) -> CheckerOutput {
            let n: u64 = policy
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            match n {
                99 => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    CheckerOutput { exit_code: Some(0), output: String::new() }
                }
                13 => CheckerOutput { exit_code: Some(2), output: "boom".into() },
                n if n % 2 == 0 => CheckerOutput {
                    exit_code: Some(0),
                    output: "satisfiability: sat".into(),
                },
                _ => CheckerOutput {
                    exit_code: Some(0),
                    output: "satisfiability: unsat".into(),
                },
            }
        }
    }

    fn corpus(root: &Path, label: &str, stems: &[&str]) {
        let dir = root.join(label);
        fs::create_dir_all(&dir).unwrap();
        for stem in stems {
            fs::write(dir.join(format!("{stem}.json")), "{}").unwrap();
        }
    }

    fn options(root: &Path, timeout: Duration) -> HarnessOptions {
        HarnessOptions {
            filtered_root: root.to_path_buf(),
            categories: vec![
                "broken/original_policy".to_string(),
                "relaxed/original_policy".to_string(),
            ],
            workers: 3,
            timeout,
            sat_marker: "satisfiability: sat".to_string(),
            log_path: root.join("check.log"),
        }
    }

    #[tokio::test]
    async fn plan_sorts_numerically_and_tolerates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path(), "broken/original_policy", &["10", "2", "1", "notes"]);
        fs::write(dir.path().join("broken/original_policy/readme.txt"), "x").unwrap();

        let harness = Harness::new(options(dir.path(), Duration::from_secs(5)), Arc::new(ParityChecker));
        let (tasks, stats) = harness.plan().await;

        let names: Vec<String> = tasks
            .iter()
            .map(|t| t.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["1.json", "2.json", "10.json", "notes.json"]);
        assert_eq!(stats.get("broken/original_policy").unwrap().total, 4);
        assert_eq!(stats.get("relaxed/original_policy").unwrap().total, 0);
    }

    #[tokio::test]
    async fn every_file_lands_in_one_bucket() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path(), "broken/original_policy", &["0", "1", "2", "13", "99"]);
        corpus(dir.path(), "relaxed/original_policy", &["4"]);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let harness = Harness::new(options(dir.path(), Duration::from_millis(200)), Arc::new(ParityChecker))
            .with_events(tx);
        let report = harness.run(std::future::pending::<()>()).await.unwrap();

        assert!(!report.interrupted);
        assert!(report.stats.is_complete());
        let broken = report.stats.get("broken/original_policy").unwrap();
        assert_eq!(broken.sat.len(), 2);
        assert_eq!(broken.unsat.len(), 1);
        assert_eq!(broken.errors.len(), 1);
        assert_eq!(broken.timeouts.len(), 1);
        assert_eq!(report.stats.get("relaxed/original_policy").unwrap().sat.len(), 1);

        let mut completed = 0;
        while let Ok(event) = rx.try_recv() {
            if let HarnessEvent::Completed { .. } = event {
                completed += 1;
            }
        }
        assert_eq!(completed, 6);

        let log = fs::read_to_string(dir.path().join("check.log")).unwrap();
        assert!(log.contains("--- [broken/original_policy] 99.json ---\n[TIMEOUT >0s]\n\n"));
        assert!(log.contains("--- [broken/original_policy] 13.json ---\nboom\n\n"));
        assert!(log.trim_end().ends_with("=== end of run ==="));
    }

    #[tokio::test]
    async fn shutdown_returns_partial_report() {
        let dir = tempfile::tempdir().unwrap();
        corpus(dir.path(), "broken/original_policy", &["0", "1", "99"]);

        let harness = Harness::new(options(dir.path(), Duration::from_secs(30)), Arc::new(ParityChecker));
        let report = harness
            .run(tokio::time::sleep(Duration::from_millis(300)))
            .await
            .unwrap();

        assert!(report.interrupted);
        assert_eq!(report.stats.total(), 3);
        assert_eq!(report.stats.completed(), 2);
        let log = fs::read_to_string(dir.path().join("check.log")).unwrap();
        assert!(log.trim_end().ends_with("=== run interrupted ==="));
    }

    #[tokio::test]
    async fn zero_workers_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = options(dir.path(), Duration::from_secs(1));
        opts.workers = 0;
        let err = Harness::new(opts, Arc::new(ParityChecker))
            .run(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::NoWorkers));
    }
}
