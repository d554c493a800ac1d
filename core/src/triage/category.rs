use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level triage outcome; a source post lands in at most one.
///
/// Variants are declared in precedence order: when two categories claim the
/// same post, the smaller one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Body and accepted answer both carried a policy.
    Repaired,
    /// No accepted answer; body carried a policy.
    Broken,
    /// No accepted answer; body only matched the loose heuristic.
    Relaxed,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Repaired, Category::Broken, Category::Relaxed];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Repaired => "repaired",
            Category::Broken => "broken",
            Category::Relaxed => "relaxed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Categories whose pass reads this category's claims, and so must be
    /// rebuilt whenever this one is.
    pub fn dependents(self) -> &'static [Category] {
        match self {
            Category::Broken => &[Category::Relaxed],
            Category::Repaired | Category::Relaxed => &[],
        }
    }

    /// Roles written for every entry in this category.
    pub fn roles(self) -> &'static [Role] {
        match self {
            Category::Repaired => &[Role::OriginalPolicy, Role::Intent, Role::Results],
            Category::Broken | Category::Relaxed => &[Role::OriginalPolicy, Role::Intent],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    OriginalPolicy,
    Intent,
    Results,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::OriginalPolicy => "original_policy",
            Role::Intent => "intent",
            Role::Results => "results",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "original_policy" => Some(Role::OriginalPolicy),
            "intent" => Some(Role::Intent),
            "results" => Some(Role::Results),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
