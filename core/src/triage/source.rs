use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{CorpusError, TriageError};

pub const BODY_FILE: &str = "body.json";
pub const ANSWER_FILE: &str = "accepted_answer.json";

/// One scraped post: the question body and, when the thread has one, the
/// accepted answer. Blank text counts as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePost {
    /// Folder name under the saved root; the post's stable identity.
    pub folder: String,
    pub body: Option<String>,
    pub accepted_answer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BodyRecord {
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerRecord {
    #[serde(default)]
    accepted_answer: Option<String>,
}

/// Loads every post folder under `saved_root` in folder-name order.
///
/// Posts whose files cannot be read or decoded are logged and skipped.
pub fn load_posts(saved_root: &Path) -> Result<Vec<SourcePost>, TriageError> {
    if !saved_root.is_dir() {
        return Err(TriageError::SourceMissing(saved_root.to_path_buf()));
    }

    let entries = fs::read_dir(saved_root).map_err(|e| CorpusError::io(saved_root, e))?;
    let mut folders: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CorpusError::io(saved_root, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
            tracing::warn!(
                target: "polsift.triage",
                path = %path.display(),
                "skipping folder with non-utf8 name"
            );
            continue;
        };
        folders.push((name, path));
    }
    folders.sort_by(|a, b| a.0.cmp(&b.0));

    let mut posts = Vec::with_capacity(folders.len());
    for (folder, path) in folders {
        match load_post(folder, &path) {
            Ok(post) => posts.push(post),
            Err(reason) => {
                tracing::warn!(
                    target: "polsift.triage",
                    path = %path.display(),
                    %reason,
                    "skipping unreadable post"
                );
            }
        }
    }
    Ok(posts)
}

fn load_post(folder: String, dir: &Path) -> Result<SourcePost, String> {
    let body = read_record::<BodyRecord>(&dir.join(BODY_FILE))?.and_then(|r| r.body);
    let accepted_answer =
        read_record::<AnswerRecord>(&dir.join(ANSWER_FILE))?.and_then(|r| r.accepted_answer);
    Ok(SourcePost {
        folder,
        body: body.filter(|s| !s.trim().is_empty()),
        accepted_answer: accepted_answer.filter(|s| !s.trim().is_empty()),
    })
}

fn read_record<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let text = String::from_utf8(raw).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str::<T>(&text)
        .map(Some)
        .map_err(|e| format!("{}: {e}", path.display()))
}
