use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::policy::{has_keys, statement_entries, KEY_ACTION, KEY_EFFECT, KEY_STATEMENT, KEY_VERSION};

/// Decides whether a parsed brace block is a policy worth keeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptancePolicy {
    /// A bare statement (`Effect` + `Action`), or a document whose first
    /// `Statement` entry is one.
    #[default]
    Shape,
    /// `Shape`, or any document carrying both `Version` and `Statement`.
    Loose,
}

impl AcceptancePolicy {
    pub fn accepts(self, value: &Value) -> bool {
        let Some(map) = value.as_object() else {
            return false;
        };

        if has_keys(map, &[KEY_EFFECT, KEY_ACTION]) {
            return true;
        }

        if let Some(statement) = map.get(KEY_STATEMENT) {
            let first_is_statement = statement_entries(statement)
                .first()
                .and_then(|v| v.as_object())
                .is_some_and(|m| has_keys(m, &[KEY_EFFECT, KEY_ACTION]));
            if first_is_statement {
                return true;
            }
        }

        match self {
            AcceptancePolicy::Shape => false,
            AcceptancePolicy::Loose => has_keys(map, &[KEY_VERSION, KEY_STATEMENT]),
        }
    }
}
