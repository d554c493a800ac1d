//! Relocation of noncompliant documents, with their structural siblings,
//! out of the working corpus into a mirrored isolation tree.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::CorpusError;
use crate::triage::{Category, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineRecord {
    pub primary: Relocation,
    /// Siblings that existed and moved with the primary file.
    pub siblings: Vec<Relocation>,
}

impl QuarantineRecord {
    pub fn files_moved(&self) -> usize {
        1 + self.siblings.len()
    }
}

#[derive(Debug, Clone)]
pub struct Quarantine {
    working_root: PathBuf,
    isolation_root: PathBuf,
}

impl Quarantine {
    pub fn new(working_root: impl Into<PathBuf>, isolation_root: impl Into<PathBuf>) -> Self {
        Self {
            working_root: working_root.into(),
            isolation_root: isolation_root.into(),
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(&cfg.paths.filtered_root, &cfg.paths.quarantine_root)
    }

    pub fn isolation_root(&self) -> &Path {
        &self.isolation_root
    }

    fn relative<'a>(&self, path: &'a Path) -> Result<&'a Path, CorpusError> {
        path.strip_prefix(&self.working_root)
            .map_err(|_| CorpusError::OutsideRoot {
                path: path.to_path_buf(),
                root: self.working_root.clone(),
            })
    }

    /// Paths structurally paired with `path`, whether or not they exist.
    ///
    /// `original_policy` and `intent` pair in every category. In `repaired`
    /// a `results` file also takes its `original_policy` along; the reverse
    /// does not hold, since the answer's policy stands on its own.
    pub fn sibling_paths(&self, path: &Path) -> Result<Vec<PathBuf>, CorpusError> {
        let rel = self.relative(path)?;
        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        let [top, role, name] = parts.as_slice() else {
            return Ok(Vec::new());
        };
        let Some(role) = Role::parse(role) else {
            return Ok(Vec::new());
        };

        let paired = match role {
            Role::OriginalPolicy => Some(Role::Intent),
            Role::Intent => Some(Role::OriginalPolicy),
            Role::Results if Category::parse(top) == Some(Category::Repaired) => {
                Some(Role::OriginalPolicy)
            }
            Role::Results => None,
        };

        Ok(paired
            .map(|r| self.working_root.join(top).join(r.as_str()).join(name))
            .into_iter()
            .collect())
    }

    /// Moves `path` and its existing siblings into the isolation tree.
    ///
    /// All copies are made before any original is removed; if a copy fails,
    /// the copies already made are removed and the working tree is left as
    /// it was. An isolation file already at the mirrored path is never
    /// overwritten: the newcomer gets a `~N` suffix instead.
    pub fn quarantine(&self, path: &Path) -> Result<QuarantineRecord, CorpusError> {
        let primary = self.plan(path)?;
        let siblings = self
            .sibling_paths(path)?
            .into_iter()
            .filter(|p| p.is_file())
            .map(|p| self.plan(&p))
            .collect::<Result<Vec<_>, _>>()?;
        let moves: Vec<&Relocation> = std::iter::once(&primary).chain(siblings.iter()).collect();

        let mut copied: Vec<&Path> = Vec::new();
        for relocation in &moves {
            if let Err(err) = copy_into_place(relocation) {
                for dest in copied {
                    let _ = fs::remove_file(dest);
                }
                return Err(err);
            }
            copied.push(&relocation.to);
        }

        let mut removed: Vec<&Relocation> = Vec::new();
        for relocation in &moves {
            if let Err(source) = fs::remove_file(&relocation.from) {
                return Err(undo_removals(&moves, &removed, &relocation.from, source));
            }
            removed.push(*relocation);
        }

        tracing::info!(
            target: "polsift.quarantine",
            path = %primary.from.display(),
            to = %primary.to.display(),
            siblings = siblings.len(),
            "quarantined"
        );
        Ok(QuarantineRecord { primary, siblings })
    }

    fn plan(&self, path: &Path) -> Result<Relocation, CorpusError> {
        let rel = self.relative(path)?;
        Ok(Relocation {
            from: path.to_path_buf(),
            to: free_destination(self.isolation_root.join(rel)),
        })
    }
}

/// First of `dest`, `stem~1.ext`, `stem~2.ext`, ... that does not exist yet.
fn free_destination(dest: PathBuf) -> PathBuf {
    if !dest.exists() {
        return dest;
    }
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dest
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1u32..)
        .map(|n| dest.with_file_name(format!("{stem}~{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(dest)
}

fn copy_into_place(relocation: &Relocation) -> Result<(), CorpusError> {
    if let Some(parent) = relocation.to.parent() {
        fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
    }
    fs::copy(&relocation.from, &relocation.to)
        .map(|_| ())
        .map_err(|e| CorpusError::io(&relocation.from, e))
}

// A delete failed midway: put removed originals back from their copies and
// drop every copy. If an original cannot be restored, its copy is kept and
// the error lists the files that now live only in isolation.
fn undo_removals(
    moves: &[&Relocation],
    removed: &[&Relocation],
    failed: &Path,
    source: std::io::Error,
) -> CorpusError {
    let stranded: Vec<PathBuf> = removed
        .iter()
        .filter(|r| fs::copy(&r.to, &r.from).is_err())
        .map(|r| r.from.clone())
        .collect();

    for relocation in moves {
        if !stranded.contains(&relocation.from) {
            let _ = fs::remove_file(&relocation.to);
        }
    }

    if stranded.is_empty() {
        CorpusError::io(failed, source)
    } else {
        CorpusError::PartialMove {
            path: failed.to_path_buf(),
            stranded,
            source,
        }
    }
}
