//! Integration tests for the corpus pipeline
//!
//! Saved posts go through every triage pass, then one sweep detects,
//! repairs and quarantines the result.
use std::fs;
use std::path::{Path, PathBuf};

use polsift_core::api::{
    run_passes, sweep, CheckSet, IndexMap, Quarantine, RepairOptions, RepairSet, SweepOptions,
    TriageContext, TriagePass,
};
use polsift_core::extract::AcceptancePolicy;
use polsift_core::triage::{load_posts, Category};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const FULL: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::bucket/*"}]}"#;
const NO_RESOURCE: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Action": "s3:*"}]}"#;
const EMPTY_CONDITION: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Deny", "Action": "s3:*", "Resource": "*", "Condition": {}}]}"#;
const NO_ACTION: &str = r#"{"Version": "2012-10-17", "Statement": [{"Effect": "Allow", "Resource": "*"}]}"#;

fn save_post(saved: &Path, folder: &str, body: &str, answer: Option<&str>) {
    let dir = saved.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("body.json"), json!({ "body": body }).to_string()).unwrap();
    if let Some(answer) = answer {
        fs::write(
            dir.join("accepted_answer.json"),
            json!({ "accepted_answer": answer }).to_string(),
        )
        .unwrap();
    }
}

fn read(path: PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

struct Fixture {
    _dir: tempfile::TempDir,
    saved: PathBuf,
    filtered: PathBuf,
    quarantine: PathBuf,
    index_file: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let saved = root.join("saved_pages");
    save_post(
        &saved,
        "post-a",
        &format!("My bucket policy {FULL} does not work"),
        Some(&format!("Use this instead: {FULL}")),
    );
    save_post(&saved, "post-b", &format!("Denied with {NO_RESOURCE} today"), None);
    save_post(&saved, "post-c", &format!("{EMPTY_CONDITION}\nWhy is this rejected?"), None);
    save_post(
        &saved,
        "post-d",
        &format!("Tried {NO_ACTION} and then \"Action\": [\"s3:Get*\"] separately"),
        None,
    );
    save_post(&saved, "post-e", "No policy here at all", None);

    Fixture {
        saved,
        filtered: root.join("filtered_pages"),
        quarantine: root.join("quarantine"),
        index_file: root.join("triage_index.json"),
        _dir: dir,
    }
}

fn context(fx: &Fixture) -> TriageContext {
    TriageContext {
        filtered_root: fx.filtered.clone(),
        index_file: fx.index_file.clone(),
        acceptance: AcceptancePolicy::Shape,
        relaxed_acceptance: AcceptancePolicy::Loose,
    }
}

#[test]
fn triage_fills_each_category_from_zero() {
    let fx = fixture();
    let posts = load_posts(&fx.saved).unwrap();
    assert_eq!(posts.len(), 5);

    let reports = run_passes(&TriagePass::ORDERED, &posts, &context(&fx)).unwrap();
    let saved: Vec<usize> = reports.iter().map(|r| r.saved).collect();
    assert_eq!(saved, vec![1, 2, 1]);

    let repaired = fx.filtered.join("repaired");
    assert_eq!(read(repaired.join("original_policy/0.json")), serde_json::from_str::<Value>(FULL).unwrap());
    assert_eq!(read(repaired.join("results/0.json")), serde_json::from_str::<Value>(FULL).unwrap());
    assert_eq!(
        read(repaired.join("intent/0.json")),
        json!({ "body": "My bucket policy  does not work" })
    );

    assert_eq!(
        read(fx.filtered.join("broken/original_policy/0.json")),
        serde_json::from_str::<Value>(NO_RESOURCE).unwrap()
    );
    assert!(fx.filtered.join("broken/original_policy/1.json").is_file());
    assert!(!fx.filtered.join("broken/results").exists());
    assert_eq!(
        read(fx.filtered.join("relaxed/original_policy/0.json")),
        serde_json::from_str::<Value>(NO_ACTION).unwrap()
    );

    let index = IndexMap::load(&fx.index_file).unwrap();
    assert_eq!(index.len(), 4);
    assert_eq!(index.get("post-b").map(|e| (e.category, e.index)), Some((Category::Broken, 0)));
    assert_eq!(index.get("post-d").map(|e| e.category), Some(Category::Relaxed));
    assert!(index.get("post-e").is_none());
}

#[test]
fn rerunning_a_pass_keeps_indices_dense() {
    let fx = fixture();
    let posts = load_posts(&fx.saved).unwrap();
    let ctx = context(&fx);

    run_passes(&TriagePass::ORDERED, &posts, &ctx).unwrap();
    let again = run_passes(&[TriagePass::Broken], &posts, &ctx).unwrap();
    assert_eq!(again[0].saved, 2);

    let index = IndexMap::load(&fx.index_file).unwrap();
    assert_eq!(index.get("post-c").map(|e| e.index), Some(1));
    // Relaxed reads broken's claims, so it is emptied until its pass runs again.
    assert_eq!(index.len(), 3);
    assert!(index.get("post-d").is_none());
    assert!(!fx.filtered.join("relaxed/original_policy/0.json").exists());

    let relaxed = run_passes(&[TriagePass::Relaxed], &posts, &ctx).unwrap();
    assert_eq!(relaxed[0].saved, 1);
    assert_eq!(IndexMap::load(&fx.index_file).unwrap().len(), 4);
}

#[test]
fn relaxed_before_broken_is_rejected() {
    let fx = fixture();
    let posts = load_posts(&fx.saved).unwrap();
    assert!(run_passes(&[TriagePass::Relaxed], &posts, &context(&fx)).is_err());
}

#[test]
fn sweep_repairs_and_quarantines_triaged_corpus() {
    let fx = fixture();
    let posts = load_posts(&fx.saved).unwrap();
    run_passes(&TriagePass::ORDERED, &posts, &context(&fx)).unwrap();

    let quarantine = Quarantine::new(&fx.filtered, &fx.quarantine);
    let opts = SweepOptions {
        checks: Some(CheckSet::all()),
        repairs: Some(RepairSet::all()),
    };
    let report = sweep(&fx.filtered, &opts, &RepairOptions::default(), &quarantine).unwrap();

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.quarantined.len(), 2);

    // Missing Resource and missing Action both leave, each with its intent.
    for rel in [
        "broken/original_policy/0.json",
        "broken/intent/0.json",
        "relaxed/original_policy/0.json",
        "relaxed/intent/0.json",
    ] {
        assert!(!fx.filtered.join(rel).exists(), "{rel} still in working tree");
        assert!(fx.quarantine.join(rel).is_file(), "{rel} not quarantined");
    }

    let repaired = read(fx.filtered.join("broken/original_policy/1.json"));
    assert_eq!(
        repaired,
        json!({
            "Version": "2012-10-17",
            "Statement": [{"Effect": "Deny", "Action": "s3:*", "Resource": "*", "Sid": "policy_1"}]
        })
    );
    let results = read(fx.filtered.join("repaired/results/0.json"));
    assert_eq!(results["Statement"][0]["Sid"], json!("policy_1"));

    // A second sweep finds nothing left to do.
    let second = sweep(&fx.filtered, &opts, &RepairOptions::default(), &quarantine).unwrap();
    assert!(second.flagged.is_empty(), "{:?}", second.flagged);
    assert_eq!(second.repaired, 0);
    assert!(second.quarantined.is_empty());
}
