use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CorpusError, TriageError};

use super::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub category: Category,
    pub index: usize,
}

/// Persisted assignment of source folders to category indices.
///
/// Keying by folder name makes category membership exclusive and lets a
/// later pass see what an earlier pass claimed without relying on walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMap {
    #[serde(default)]
    entries: BTreeMap<String, IndexEntry>,
}

impl IndexMap {
    /// Reads the map at `path`; a missing file is an empty map.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| TriageError::IndexMapDecode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), TriageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CorpusError::io(parent, e))?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(|source| CorpusError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|e| CorpusError::io(path, e).into())
    }

    pub fn get(&self, folder: &str) -> Option<IndexEntry> {
        self.entries.get(folder).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry of `category` ahead of re-running its pass.
    pub fn clear_category(&mut self, category: Category) {
        self.entries.retain(|_, e| e.category != category);
    }

    pub fn claimed_by(&self, category: Category) -> HashSet<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.category == category)
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Records `folder` at `index` in `category`. Fails when another
    /// category already holds the folder.
    pub fn assign(
        &mut self,
        folder: &str,
        category: Category,
        index: usize,
    ) -> Result<(), TriageError> {
        if let Some(existing) = self.entries.get(folder) {
            if existing.category != category {
                return Err(TriageError::AlreadyClaimed {
                    folder: folder.to_string(),
                    held: existing.category,
                });
            }
        }
        self.entries
            .insert(folder.to_string(), IndexEntry { category, index });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_is_exclusive_across_categories() {
        let mut map = IndexMap::default();
        map.assign("post-1", Category::Broken, 0).unwrap();
        let err = map.assign("post-1", Category::Relaxed, 0).unwrap_err();
        assert!(matches!(
            err,
            TriageError::AlreadyClaimed {
                held: Category::Broken,
                ..
            }
        ));
        map.assign("post-1", Category::Broken, 3).unwrap();
        assert_eq!(map.get("post-1").unwrap().index, 3);
    }

    #[test]
    fn clear_category_keeps_other_categories() {
        let mut map = IndexMap::default();
        map.assign("a", Category::Repaired, 0).unwrap();
        map.assign("b", Category::Broken, 0).unwrap();
        map.assign("c", Category::Broken, 1).unwrap();
        map.clear_category(Category::Broken);
        assert_eq!(map.len(), 1);
        assert!(map.claimed_by(Category::Broken).is_empty());
        assert!(map.claimed_by(Category::Repaired).contains("a"));
    }

    #[test]
    fn save_and_load_preserve_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("index.json");
        assert!(IndexMap::load(&path).unwrap().is_empty());

        let mut map = IndexMap::default();
        map.assign("x", Category::Relaxed, 7).unwrap();
        map.save(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"relaxed\""));
        assert_eq!(IndexMap::load(&path).unwrap(), map);
    }
}
