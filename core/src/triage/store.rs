use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};

use crate::errors::CorpusError;
use crate::policy::write_document;

use super::{Category, Role};

/// Artifacts persisted for one triaged post.
#[derive(Debug, Clone)]
pub struct Triplet {
    pub original_policy: Value,
    pub intent: String,
    /// Ground-truth policy from the accepted answer; `repaired` only.
    pub results: Option<Value>,
}

/// Writer for `<filtered_root>/<category>/<role>/<n>.json`.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    root: PathBuf,
    category: Category,
}

impl CategoryStore {
    pub fn new(filtered_root: impl Into<PathBuf>, category: Category) -> Self {
        Self {
            root: filtered_root.into(),
            category,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn role_dir(&self, role: Role) -> PathBuf {
        self.root.join(self.category.as_str()).join(role.as_str())
    }

    pub fn entry_path(&self, role: Role, index: usize) -> PathBuf {
        self.role_dir(role).join(format!("{index}.json"))
    }

    /// Creates every role directory of the category if absent.
    pub fn ensure_layout(&self) -> Result<(), CorpusError> {
        for role in self.category.roles() {
            let dir = self.role_dir(*role);
            fs::create_dir_all(&dir).map_err(|e| CorpusError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Removes every entry file of the category, leaving the role
    /// directories in place. Returns the number of files removed.
    pub fn clear(&self) -> Result<usize, CorpusError> {
        let mut removed = 0;
        for role in self.category.roles() {
            let dir = self.role_dir(*role);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(CorpusError::io(&dir, e)),
            };
            for entry in entries {
                let path = entry.map_err(|e| CorpusError::io(&dir, e))?.path();
                let is_entry = path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                if is_entry {
                    fs::remove_file(&path).map_err(|e| CorpusError::io(&path, e))?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    pub fn write(&self, index: usize, triplet: &Triplet) -> Result<(), CorpusError> {
        write_document(
            &self.entry_path(Role::OriginalPolicy, index),
            &triplet.original_policy,
        )?;
        write_document(
            &self.entry_path(Role::Intent, index),
            &json!({ "body": triplet.intent }),
        )?;
        if let Some(results) = &triplet.results {
            write_document(&self.entry_path(Role::Results, index), results)?;
        }
        Ok(())
    }
}
