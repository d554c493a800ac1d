//! Key names and small shape helpers over policy documents.
//!
//! Documents are handled as `serde_json::Value` throughout: forum-sourced
//! policies are too irregular for a typed model, and only their shape is
//! inspected, never their semantics.

use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::CorpusError;

pub const KEY_VERSION: &str = "Version";
pub const KEY_STATEMENT: &str = "Statement";
pub const KEY_EFFECT: &str = "Effect";
pub const KEY_ACTION: &str = "Action";
pub const KEY_RESOURCE: &str = "Resource";
pub const KEY_SID: &str = "Sid";
pub const KEY_CONDITION: &str = "Condition";

/// Fields every statement must carry to stay in the working corpus.
pub const REQUIRED_STATEMENT_FIELDS: [&str; 3] = [KEY_EFFECT, KEY_ACTION, KEY_RESOURCE];

/// Views a `Statement` value as a sequence; a bare value is a one-element view.
pub fn statement_entries(statement: &Value) -> Vec<&Value> {
    match statement {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub fn has_keys(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().all(|k| map.contains_key(*k))
}

/// A mapping carrying both `Effect` and `Action`.
pub fn is_bare_statement(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|m| has_keys(m, &[KEY_EFFECT, KEY_ACTION]))
}

pub fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|m| m.is_empty())
}

/// Writes `value` as 2-space pretty JSON.
pub fn write_document(path: &Path, value: &Value) -> Result<(), CorpusError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| CorpusError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, bytes).map_err(|e| CorpusError::io(path, e))
}
