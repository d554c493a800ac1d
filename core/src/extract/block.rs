use serde_json::Value;

use super::AcceptancePolicy;

/// Result of scanning free text for an embedded policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub document: Option<Value>,
    /// Input with the accepted block removed and the ends trimmed; the
    /// untouched input when nothing was accepted.
    pub remainder: String,
}

impl Extraction {
    fn miss(text: &str) -> Self {
        Self {
            document: None,
            remainder: text.to_string(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.document.is_some()
    }
}

/// Returns the first balanced `{...}` block of `text` that parses as JSON and
/// satisfies `policy`.
///
/// Brace matching is purely lexical: braces inside JSON strings are counted
/// like any other, and a stray `}` drives the depth below zero so the next
/// `{` does not open a candidate.
pub fn extract_policy_block(text: &str, policy: AcceptancePolicy) -> Extraction {
    let bytes = text.as_bytes();
    let mut depth: i64 = 0;
    let mut start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if depth != 0 {
                    continue;
                }
                let Some(s) = start else {
                    continue;
                };
                let block = &text[s..=i];
                let Ok(value) = serde_json::from_str::<Value>(block) else {
                    continue;
                };
                if !policy.accepts(&value) {
                    continue;
                }
                tracing::trace!(
                    target: "polsift.extract",
                    start = s,
                    end = i,
                    "accepted policy block"
                );
                let mut remainder = String::with_capacity(text.len() - block.len());
                remainder.push_str(&text[..s]);
                remainder.push_str(&text[i + 1..]);
                return Extraction {
                    document: Some(value),
                    remainder: remainder.trim().to_string(),
                };
            }
            _ => {}
        }
    }

    Extraction::miss(text)
}
