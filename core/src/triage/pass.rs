use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::errors::TriageError;
use crate::extract::{extract_policy_block, AcceptancePolicy};

use super::heuristic::looks_like_allow_policy;
use super::{Category, CategoryStore, IndexMap, Role, SourcePost, Triplet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriagePass {
    Repaired,
    Broken,
    Relaxed,
}

impl TriagePass {
    /// Dependency order: relaxed reads what broken claimed.
    pub const ORDERED: [TriagePass; 3] =
        [TriagePass::Repaired, TriagePass::Broken, TriagePass::Relaxed];

    pub fn category(self) -> Category {
        match self {
            TriagePass::Repaired => Category::Repaired,
            TriagePass::Broken => Category::Broken,
            TriagePass::Relaxed => Category::Relaxed,
        }
    }
}

impl fmt::Display for TriagePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category().as_str())
    }
}

/// Paths and extraction policies shared by every pass.
#[derive(Debug, Clone)]
pub struct TriageContext {
    pub filtered_root: PathBuf,
    pub index_file: PathBuf,
    pub acceptance: AcceptancePolicy,
    pub relaxed_acceptance: AcceptancePolicy,
}

impl TriageContext {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            filtered_root: cfg.paths.filtered_root.clone(),
            index_file: cfg.paths.index_file.clone(),
            acceptance: cfg.extract.acceptance,
            relaxed_acceptance: cfg.extract.relaxed_acceptance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub pass: TriagePass,
    /// Posts meeting the pass's body/answer preconditions.
    pub considered: usize,
    pub saved: usize,
    pub skipped: usize,
}

/// Runs `passes` in the given order over the same set of posts.
pub fn run_passes(
    passes: &[TriagePass],
    posts: &[SourcePost],
    ctx: &TriageContext,
) -> Result<Vec<PassReport>, TriageError> {
    passes.iter().map(|p| run_pass(*p, posts, ctx)).collect()
}

/// Runs one pass, rebuilding its category from index 0 and recording every
/// saved post in the index map.
///
/// Entry files left by an earlier run of the category are removed first.
/// Categories that read this one's claims are emptied as well, and so is any
/// lower-precedence category found holding a post this pass claims; their
/// passes have to be run again.
pub fn run_pass(
    pass: TriagePass,
    posts: &[SourcePost],
    ctx: &TriageContext,
) -> Result<PassReport, TriageError> {
    let category = pass.category();
    let mut index_map = IndexMap::load(&ctx.index_file)?;

    let blacklist: HashSet<String> = if pass == TriagePass::Relaxed {
        let broken = CategoryStore::new(&ctx.filtered_root, Category::Broken);
        let broken_dir = broken.role_dir(Role::OriginalPolicy);
        if !broken_dir.is_dir() {
            return Err(TriageError::BrokenPassMissing(broken_dir));
        }
        index_map
            .claimed_by(Category::Broken)
            .into_iter()
            .map(str::to_string)
            .collect()
    } else {
        HashSet::new()
    };

    let store = CategoryStore::new(&ctx.filtered_root, category);
    let stale = store.clear()?;
    if stale > 0 {
        tracing::debug!(
            target: "polsift.triage",
            pass = %pass,
            removed = stale,
            "removed entries from previous run"
        );
    }
    index_map.clear_category(category);
    store.ensure_layout()?;
    for dependent in category.dependents() {
        invalidate(*dependent, ctx, &mut index_map)?;
    }

    let mut report = PassReport {
        pass,
        considered: 0,
        saved: 0,
        skipped: 0,
    };

    for post in posts {
        let Some(triplet) = (match pass {
            TriagePass::Repaired => triage_repaired(post, ctx, &mut report),
            TriagePass::Broken => triage_broken(post, ctx, &mut report),
            TriagePass::Relaxed => triage_relaxed(post, ctx, &blacklist, &mut report),
        }) else {
            continue;
        };

        if let Some(held) = index_map.get(&post.folder).map(|e| e.category) {
            if held < category {
                tracing::warn!(
                    target: "polsift.triage",
                    folder = %post.folder,
                    pass = %pass,
                    held = %held,
                    "post already triaged into a higher-precedence category, skipping"
                );
                report.skipped += 1;
                continue;
            }
            invalidate(held, ctx, &mut index_map)?;
        }

        let index = report.saved;
        index_map.assign(&post.folder, category, index)?;
        store.write(index, &triplet)?;
        tracing::debug!(
            target: "polsift.triage",
            folder = %post.folder,
            pass = %pass,
            index,
            "saved entry"
        );
        report.saved += 1;
    }

    index_map.save(&ctx.index_file)?;
    tracing::info!(
        target: "polsift.triage",
        pass = %pass,
        considered = report.considered,
        saved = report.saved,
        skipped = report.skipped,
        "triage pass finished"
    );
    Ok(report)
}

/// Empties `category` and everything depending on it, files and claims.
fn invalidate(
    category: Category,
    ctx: &TriageContext,
    index_map: &mut IndexMap,
) -> Result<(), TriageError> {
    let removed = CategoryStore::new(&ctx.filtered_root, category).clear()?;
    let claims = index_map.claimed_by(category).len();
    index_map.clear_category(category);
    if removed > 0 || claims > 0 {
        tracing::warn!(
            target: "polsift.triage",
            category = %category,
            removed,
            claims,
            "category invalidated, run its pass again"
        );
    }
    for dependent in category.dependents() {
        invalidate(*dependent, ctx, index_map)?;
    }
    Ok(())
}

fn triage_repaired(
    post: &SourcePost,
    ctx: &TriageContext,
    report: &mut PassReport,
) -> Option<Triplet> {
    let (Some(body), Some(answer)) = (&post.body, &post.accepted_answer) else {
        return None;
    };
    report.considered += 1;

    let body_hit = extract_policy_block(body, ctx.acceptance);
    let answer_hit = extract_policy_block(answer, ctx.acceptance);
    match (body_hit.document, answer_hit.document) {
        (Some(original_policy), Some(results)) => Some(Triplet {
            original_policy,
            intent: body_hit.remainder,
            results: Some(results),
        }),
        _ => {
            report.skipped += 1;
            None
        }
    }
}

fn triage_broken(
    post: &SourcePost,
    ctx: &TriageContext,
    report: &mut PassReport,
) -> Option<Triplet> {
    let (Some(body), None) = (&post.body, &post.accepted_answer) else {
        return None;
    };
    report.considered += 1;
    extract_single(body, ctx.acceptance, report)
}

fn triage_relaxed(
    post: &SourcePost,
    ctx: &TriageContext,
    blacklist: &HashSet<String>,
    report: &mut PassReport,
) -> Option<Triplet> {
    let (Some(body), None) = (&post.body, &post.accepted_answer) else {
        return None;
    };
    if blacklist.contains(&post.folder) {
        return None;
    }
    report.considered += 1;
    if !looks_like_allow_policy(body) {
        report.skipped += 1;
        return None;
    }
    extract_single(body, ctx.relaxed_acceptance, report)
}

fn extract_single(
    body: &str,
    acceptance: AcceptancePolicy,
    report: &mut PassReport,
) -> Option<Triplet> {
    let hit = extract_policy_block(body, acceptance);
    match hit.document {
        Some(original_policy) => Some(Triplet {
            original_policy,
            intent: hit.remainder,
            results: None,
        }),
        None => {
            report.skipped += 1;
            None
        }
    }
}
