use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EFFECT_ALLOW: Regex =
        Regex::new(r#"(?i)"?effect"?\s*:\s*"?allow"#).expect("static regex");
    static ref ACTION_OPENER: Regex =
        Regex::new(r#"(?i)"?action"?\s*:\s*["\[{]"#).expect("static regex");
}

/// Pattern-level test for text that probably embeds an allow statement,
/// used when the body is too mangled for a strict structural match.
pub fn looks_like_allow_policy(text: &str) -> bool {
    EFFECT_ALLOW.is_match(text) && ACTION_OPENER.is_match(text)
}
