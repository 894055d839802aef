//! Identifier handling: interface names derived from keys, name dedup, and
//! quoting of property keys that are not bare identifiers.
use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));
static BARE_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid regex"));

/// Reduce an arbitrary JSON key to identifier characters: non-word
/// characters are dropped, then any leading digits. Falls back to `_`.
pub fn sanitize(key: &str) -> String {
    let word = NON_WORD.replace_all(key, "");
    let word = word.trim_start_matches(|c: char| c.is_ascii_digit());
    if word.is_empty() { "_".to_string() } else { word.to_string() }
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
    }
}

/// Interface name candidate for a JSON key.
pub fn type_name(key: &str) -> String {
    capitalize(&sanitize(key))
}

/// `base`, or `base_1`, `base_2`, ... whichever is not taken yet.
pub fn uniq_key(names: &HashSet<String>, base: &str) -> String {
    if !names.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}_{i}"))
        .find(|candidate| !names.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

pub fn is_bare_identifier(key: &str) -> bool {
    BARE_IDENT.is_match(key)
}

/// Property name as it appears in a declaration: bare when possible, else a
/// single-quoted string literal with JSON escapes and `'` escaped.
pub fn quote_key(key: &str) -> String {
    if is_bare_identifier(key) {
        return key.to_string();
    }
    let json = serde_json::Value::from(key).to_string();
    let inner = &json[1..json.len() - 1];
    format!("'{}'", inner.replace('\'', "\\'"))
}
