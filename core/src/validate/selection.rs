use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} `{token}` (expected one of: {expected})")]
pub struct UnknownToken {
    pub kind: &'static str,
    pub token: String,
    pub expected: &'static str,
}

/// Which structural checks `detect` runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSet {
    pub sid: bool,
    /// Mandatory `Effect`/`Action`/`Resource` fields.
    pub required: bool,
    pub condition: bool,
    pub empty_statement: bool,
    pub statement: bool,
    /// A strict subset was requested; file-level problems are not reported.
    pub limited: bool,
}

impl CheckSet {
    const EXPECTED: &'static str = "all, sid, r, condition, empty-stmt, statement";

    pub fn all() -> Self {
        Self {
            sid: true,
            required: true,
            condition: true,
            empty_statement: true,
            statement: true,
            limited: false,
        }
    }

    /// Mandatory-field check without limited mode, as used by the
    /// quarantine gate.
    pub fn required_fields() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Parses a comma-separated selection such as `sid,r`.
    pub fn parse(list: &str) -> Result<Self, UnknownToken> {
        let tokens = split_tokens(list);
        if tokens.iter().any(|t| t == "all") {
            return Ok(Self::all());
        }
        let mut set = Self::default();
        for token in &tokens {
            match token.as_str() {
                "sid" => set.sid = true,
                "r" => set.required = true,
                "condition" => set.condition = true,
                "empty-stmt" => set.empty_statement = true,
                "statement" => set.statement = true,
                _ => {
                    return Err(UnknownToken {
                        kind: "check",
                        token: token.clone(),
                        expected: Self::EXPECTED,
                    })
                }
            }
        }
        set.limited = !tokens.is_empty();
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        !(self.sid || self.required || self.condition || self.empty_statement || self.statement)
    }
}

/// Which repairs `repair` applies, plus the quarantine gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSet {
    pub sid: bool,
    pub statement: bool,
    pub condition: bool,
    pub empty_statement: bool,
    pub quarantine: bool,
}

impl RepairSet {
    const EXPECTED: &'static str = "all, sid, statement, condition, empty-stmt, quarantine";

    pub fn all() -> Self {
        Self {
            sid: true,
            statement: true,
            condition: true,
            empty_statement: true,
            quarantine: true,
        }
    }

    pub fn parse(list: &str) -> Result<Self, UnknownToken> {
        let tokens = split_tokens(list);
        if tokens.iter().any(|t| t == "all") {
            return Ok(Self::all());
        }
        let mut set = Self::default();
        for token in &tokens {
            match token.as_str() {
                "sid" => set.sid = true,
                "statement" => set.statement = true,
                "condition" => set.condition = true,
                "empty-stmt" => set.empty_statement = true,
                "quarantine" | "r" => set.quarantine = true,
                _ => {
                    return Err(UnknownToken {
                        kind: "repair",
                        token: token.clone(),
                        expected: Self::EXPECTED,
                    })
                }
            }
        }
        Ok(set)
    }

    /// Whether any in-place document repair is selected.
    pub fn rewrites(&self) -> bool {
        self.sid || self.statement || self.condition || self.empty_statement
    }
}

fn split_tokens(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
