//! Integration tests for the check harness
//!
//! A small shell script stands in for the external checker so the real
//! process path is exercised: argument passing, working directory, output
//! capture, exit status and timeouts.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use polsift_core::api::{Harness, HarnessOptions, HarnessReport, Outcome, ProcessChecker};

const CHECKER: &str = r#"
policy="$2"
echo "cwd=$(pwd) bound=$4"
if grep -q hang "$policy"; then sleep 30; fi
if grep -q fail "$policy"; then echo "parse failure" >&2; exit 3; fi
if grep -q Deny "$policy"; then echo "satisfiability: unsat"; else echo "satisfiability: sat"; fi
"#;

fn write_policies(root: &Path) {
    let dir = root.join("filtered_pages/broken/original_policy");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("0.json"), r#"{"Statement": [{"Effect": "Allow"}]}"#).unwrap();
    fs::write(dir.join("1.json"), r#"{"Statement": [{"Effect": "Deny"}]}"#).unwrap();
    fs::write(dir.join("2.json"), r#"{"fail": true}"#).unwrap();
    fs::write(dir.join("10.json"), r#"{"hang": true}"#).unwrap();
}

async fn run(root: &Path, workers: usize) -> HarnessReport {
    let workdir = root.join("src");
    fs::create_dir_all(&workdir).unwrap();
    let script = root.join("checker.sh");
    fs::write(&script, CHECKER).unwrap();

    let checker = ProcessChecker::new(
        "sh",
        vec![script.display().to_string()],
        &workdir,
        100,
    )
    .unwrap();
    let opts = HarnessOptions {
        filtered_root: root.join("filtered_pages"),
        categories: vec![
            "broken/original_policy".to_string(),
            "relaxed/original_policy".to_string(),
        ],
        workers,
        timeout: Duration::from_secs(2),
        sat_marker: "satisfiability: sat".to_string(),
        log_path: root.join("check_policies.log"),
    };
    Harness::new(opts, Arc::new(checker))
        .run(std::future::pending::<()>())
        .await
        .unwrap()
}

#[tokio::test]
async fn process_checker_outcomes_are_classified() {
    let dir = tempfile::tempdir().unwrap();
    write_policies(dir.path());

    let report = run(dir.path(), 4).await;
    assert!(!report.interrupted);
    assert!(report.stats.is_complete());
    assert_eq!(report.stats.total(), 4);
    assert_eq!(report.stats.count(Outcome::Sat), 1);
    assert_eq!(report.stats.count(Outcome::Unsat), 1);
    assert_eq!(report.stats.count(Outcome::Error), 1);
    assert_eq!(report.stats.count(Outcome::Timeout), 1);

    let broken = report.stats.get("broken/original_policy").unwrap();
    assert_eq!(broken.timeouts[0].file_name().unwrap(), "10.json");
    assert_eq!(report.stats.get("relaxed/original_policy").unwrap().total, 0);

    let log = fs::read_to_string(&report.log_path).unwrap();
    assert!(log.starts_with(&format!("=== check run {} at ", report.run_id)));
    assert!(log.contains("--- [broken/original_policy] 10.json ---\n[TIMEOUT >2s]\n\n"));
    assert!(log.contains("parse failure"));
    assert!(log.contains("bound=100"));
    assert!(log.contains("/src bound="));
    assert!(log.ends_with("=== end of run ===\n"));
}

#[tokio::test]
async fn single_worker_still_completes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    write_policies(dir.path());

    let report = run(dir.path(), 1).await;
    let broken = report.stats.get("broken/original_policy").unwrap();
    assert_eq!(broken.completed(), broken.total);
    assert_eq!(broken.sat.len() + broken.unsat.len(), 2);
}

#[tokio::test]
async fn second_run_appends_to_the_log() {
    let dir = tempfile::tempdir().unwrap();
    write_policies(dir.path());
    fs::remove_file(dir.path().join("filtered_pages/broken/original_policy/10.json")).unwrap();

    let first = run(dir.path(), 2).await;
    let second = run(dir.path(), 2).await;
    assert_ne!(first.run_id, second.run_id);

    let log = fs::read_to_string(&second.log_path).unwrap();
    assert_eq!(log.matches("=== end of run ===").count(), 2);
    assert!(log.contains(&first.run_id));
}
