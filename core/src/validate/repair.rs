use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::CorpusError;
use crate::policy::{
    is_bare_statement, is_empty_object, write_document, KEY_CONDITION, KEY_SID, KEY_STATEMENT,
};

use super::RepairSet;

/// How a document without a top-level `Statement` is completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementSynthesis {
    /// Insert `Statement: []`.
    #[default]
    EmptyList,
    /// Wrap a document that is itself a bare statement as
    /// `{Statement: [document]}`; leave anything else alone. Enables
    /// removal of empty `Statement` lists.
    WrapBareStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOptions {
    /// Generated Sids are `<sid_prefix><n>`, `n` counting from 1 per document.
    pub sid_prefix: String,
    pub synthesis: StatementSynthesis,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            sid_prefix: "policy_".to_string(),
            synthesis: StatementSynthesis::EmptyList,
        }
    }
}

impl RepairOptions {
    /// Removing an empty `Statement` would undo `EmptyList` synthesis on
    /// every run, so it is only honored when wrapping.
    pub fn removes_empty_statement(&self, repairs: &RepairSet) -> bool {
        repairs.empty_statement && self.synthesis == StatementSynthesis::WrapBareStatement
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    Unchanged,
    Repaired,
    /// The file could not be read or parsed; it was left untouched.
    NotRepairable,
}

/// Applies the selected repairs in place. Returns whether anything changed.
///
/// Every repair is idempotent, so a second call with the same selection
/// returns `false`.
pub fn repair(document: &mut Value, repairs: &RepairSet, opts: &RepairOptions) -> bool {
    if !document.is_object() {
        return false;
    }

    let mut modified = false;
    if repairs.statement {
        modified |= normalize_statement(document, opts.synthesis);
    }

    let Some(map) = document.as_object_mut() else {
        return modified;
    };

    if repairs.sid || repairs.condition {
        let mut taken: HashSet<String> = match map.get(KEY_STATEMENT) {
            Some(Value::Array(items)) => items.iter().filter_map(sid_of).collect(),
            Some(single) => sid_of(single).into_iter().collect(),
            None => HashSet::new(),
        };

        let entries: Vec<&mut Value> = match map.get_mut(KEY_STATEMENT) {
            Some(Value::Array(items)) => items.iter_mut().collect(),
            Some(single) => vec![single],
            None => Vec::new(),
        };

        let mut counter = 0usize;
        for entry in entries {
            let Some(stmt) = entry.as_object_mut() else {
                continue;
            };
            if repairs.condition && stmt.get(KEY_CONDITION).is_some_and(is_empty_object) {
                stmt.shift_remove(KEY_CONDITION);
                modified = true;
            }
            if repairs.sid && !stmt.contains_key(KEY_SID) {
                let sid = loop {
                    counter += 1;
                    let candidate = format!("{}{}", opts.sid_prefix, counter);
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                };
                taken.insert(sid.clone());
                stmt.insert(KEY_SID.to_string(), Value::String(sid));
                modified = true;
            }
        }
    }

    if opts.removes_empty_statement(repairs)
        && map
            .get(KEY_STATEMENT)
            .and_then(Value::as_array)
            .is_some_and(|a| a.is_empty())
    {
        map.shift_remove(KEY_STATEMENT);
        modified = true;
    }

    modified
}

fn normalize_statement(document: &mut Value, synthesis: StatementSynthesis) -> bool {
    if let Some(slot) = document.get_mut(KEY_STATEMENT) {
        if slot.is_array() {
            return false;
        }
        let inner = slot.take();
        *slot = Value::Array(vec![inner]);
        return true;
    }

    match synthesis {
        StatementSynthesis::EmptyList => match document.as_object_mut() {
            Some(map) => {
                map.insert(KEY_STATEMENT.to_string(), Value::Array(Vec::new()));
                true
            }
            None => false,
        },
        StatementSynthesis::WrapBareStatement => {
            if !is_bare_statement(document) {
                return false;
            }
            let inner = document.take();
            *document = json!({ KEY_STATEMENT: [inner] });
            true
        }
    }
}

fn sid_of(value: &Value) -> Option<String> {
    value.get(KEY_SID).and_then(Value::as_str).map(str::to_string)
}

/// Repairs the document stored at `path`, rewriting it only when a repair
/// changed something.
pub fn repair_file(
    path: &Path,
    repairs: &RepairSet,
    opts: &RepairOptions,
) -> Result<RepairOutcome, CorpusError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(
                target: "polsift.validate",
                path = %path.display(),
                error = %e,
                "unreadable, not repairable"
            );
            return Ok(RepairOutcome::NotRepairable);
        }
    };
    let Ok(mut document) = serde_json::from_str::<Value>(&raw) else {
        return Ok(RepairOutcome::NotRepairable);
    };

    if !repair(&mut document, repairs, opts) {
        return Ok(RepairOutcome::Unchanged);
    }
    write_document(path, &document)?;
    Ok(RepairOutcome::Repaired)
}
