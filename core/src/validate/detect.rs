use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::policy::{
    is_empty_object, statement_entries, KEY_CONDITION, KEY_SID, KEY_STATEMENT,
    REQUIRED_STATEMENT_FIELDS,
};

use super::CheckSet;

/// A reason a document is noncompliant. Issues are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ReadError(String),
    EmptyFile,
    InvalidJson(String),
    NotAnObject,
    MissingStatement,
    EmptyStatement,
    StatementNotObject { index: usize },
    MissingField { index: usize, field: &'static str },
    MissingSid { index: usize },
    EmptyCondition { index: usize },
}

impl Issue {
    /// File-level problems that limited mode suppresses.
    pub fn is_file_level(&self) -> bool {
        matches!(
            self,
            Issue::ReadError(_) | Issue::EmptyFile | Issue::InvalidJson(_) | Issue::NotAnObject
        )
    }

    /// A statement lacks `Effect`, `Action` or `Resource`.
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Issue::MissingField { .. })
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::ReadError(e) => write!(f, "File read error: {e}"),
            Issue::EmptyFile => f.write_str("File is empty or whitespace only"),
            Issue::InvalidJson(e) => write!(f, "Invalid JSON: {e}"),
            Issue::NotAnObject => f.write_str("Top-level value is not an object"),
            Issue::MissingStatement => f.write_str("Missing top-level 'Statement'"),
            Issue::EmptyStatement => f.write_str("'Statement' is an empty list"),
            Issue::StatementNotObject { index } => {
                write!(f, "Statement[{index}] is not an object")
            }
            Issue::MissingField { index, field } => {
                write!(f, "Statement[{index}] missing '{field}'")
            }
            Issue::MissingSid { index } => write!(f, "Statement[{index}] missing 'Sid'"),
            Issue::EmptyCondition { index } => {
                write!(f, "Statement[{index}] has empty 'Condition'")
            }
        }
    }
}

/// Runs the enabled structural checks against a parsed document.
pub fn detect(document: &Value, checks: &CheckSet) -> Vec<Issue> {
    let mut issues = Vec::new();

    let Some(map) = document.as_object() else {
        if !checks.limited {
            issues.push(Issue::NotAnObject);
        }
        return issues;
    };

    let Some(statement) = map.get(KEY_STATEMENT) else {
        if checks.statement {
            issues.push(Issue::MissingStatement);
        }
        return issues;
    };

    if checks.empty_statement && statement.as_array().is_some_and(|a| a.is_empty()) {
        issues.push(Issue::EmptyStatement);
    }

    for (index, entry) in statement_entries(statement).into_iter().enumerate() {
        let Some(stmt) = entry.as_object() else {
            if !checks.limited {
                issues.push(Issue::StatementNotObject { index });
            }
            continue;
        };

        if checks.required {
            for field in REQUIRED_STATEMENT_FIELDS {
                if !stmt.contains_key(field) {
                    issues.push(Issue::MissingField { index, field });
                }
            }
        }

        if checks.sid && !stmt.contains_key(KEY_SID) {
            issues.push(Issue::MissingSid { index });
        }

        if checks.condition && stmt.get(KEY_CONDITION).is_some_and(is_empty_object) {
            issues.push(Issue::EmptyCondition { index });
        }
    }

    issues
}

/// Checks raw file content, reporting empty or unparseable input as
/// file-level issues.
pub fn detect_source(raw: &str, checks: &CheckSet) -> Vec<Issue> {
    if raw.trim().is_empty() {
        return file_level(Issue::EmptyFile, checks);
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(document) => detect(&document, checks),
        Err(e) => file_level(Issue::InvalidJson(e.to_string()), checks),
    }
}

pub fn detect_file(path: &Path, checks: &CheckSet) -> Vec<Issue> {
    match std::fs::read_to_string(path) {
        Ok(raw) => detect_source(&raw, checks),
        Err(e) => file_level(Issue::ReadError(e.to_string()), checks),
    }
}

fn file_level(issue: Issue, checks: &CheckSet) -> Vec<Issue> {
    if checks.limited {
        Vec::new()
    } else {
        vec![issue]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn required_only_reports_each_missing_field() {
        let checks = CheckSet::parse("r").unwrap();
        let issues = detect(&json!({"Statement": [{"Effect": "Allow"}]}), &checks);
        assert_eq!(
            issues,
            vec![
                Issue::MissingField { index: 0, field: "Action" },
                Issue::MissingField { index: 0, field: "Resource" },
            ]
        );
        assert_eq!(issues[0].to_string(), "Statement[0] missing 'Action'");
    }

    #[test]
    fn full_checks_cover_sid_condition_and_shape() {
        let doc = json!({
            "Statement": [
                {"Sid": "a", "Effect": "Allow", "Action": "*", "Resource": "*", "Condition": {}},
                "not-a-statement",
                {"Effect": "Deny", "Action": "*", "Resource": "*"}
            ]
        });
        let issues = detect(&doc, &CheckSet::all());
        assert_eq!(
            issues,
            vec![
                Issue::EmptyCondition { index: 0 },
                Issue::StatementNotObject { index: 1 },
                Issue::MissingSid { index: 2 },
            ]
        );
    }

    #[test]
    fn bare_statement_object_is_checked_as_entry_zero() {
        let doc = json!({"Statement": {"Effect": "Allow", "Action": "*"}});
        let issues = detect(&doc, &CheckSet::parse("r").unwrap());
        assert_eq!(issues, vec![Issue::MissingField { index: 0, field: "Resource" }]);
    }

    #[test]
    fn missing_and_empty_statement() {
        let all = CheckSet::all();
        assert_eq!(detect(&json!({"Version": "1"}), &all), vec![Issue::MissingStatement]);
        assert_eq!(detect(&json!({"Statement": []}), &all), vec![Issue::EmptyStatement]);
        assert!(detect(&json!({"Version": "1"}), &CheckSet::parse("sid").unwrap()).is_empty());
    }

    #[test]
    fn limited_mode_suppresses_file_level_issues() {
        let limited = CheckSet::parse("sid").unwrap();
        assert!(detect_source("   ", &limited).is_empty());
        assert!(detect_source("{oops", &limited).is_empty());
        assert!(detect(&json!([1]), &limited).is_empty());

        let all = CheckSet::all();
        assert_eq!(detect_source("", &all), vec![Issue::EmptyFile]);
        assert!(matches!(detect_source("{oops", &all)[0], Issue::InvalidJson(_)));
        assert_eq!(detect(&json!([1]), &all), vec![Issue::NotAnObject]);
    }

    #[test]
    fn unreadable_file_is_an_issue_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let issues = detect_file(&tmp.path().join("missing.json"), &CheckSet::all());
        assert!(matches!(issues.as_slice(), [Issue::ReadError(_)]));
    }
}
