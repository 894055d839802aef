//! Reads generated declarations back into structured form.
//!
//! `parse_types` / `parse_aliases` pattern-match the declaration grammar;
//! `verify` additionally walks the text line by line and rejects anything
//! outside that grammar.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static INTERFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^(export )?interface (\S+) \{\n(.*?)\n\}").expect("valid regex"));
static INTERFACE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(export )?interface (\S+) \{$").expect("valid regex"));
static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^  ('(?:\\\\|\\'|[^'])*'|[A-Za-z_$][A-Za-z0-9_$]*)(\?)?: (.+);$").expect("valid regex")
});
static ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(export )?type (\S+) = (.+);$").expect("valid regex"));
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid regex"));

const BUILTIN_TYPES: &[&str] = &["string", "number", "boolean", "null", "unknown", "Array"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInterface {
    pub name: String,
    pub exported: bool,
    pub properties: Vec<InterfaceProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAlias {
    pub name: String,
    pub exported: bool,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub aliases: Vec<ParsedAlias>,
    pub interfaces: Vec<ParsedInterface>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("line {line}: not part of the declaration grammar: {text:?}")]
    UnrecognizedLine { line: usize, text: String },

    #[error("interface `{name}` is never closed")]
    UnterminatedInterface { name: String },

    #[error("bad quoted key {key}: {reason}")]
    BadQuotedKey { key: String, reason: String },
}

fn property_from_captures(caps: &regex::Captures<'_>) -> Result<InterfaceProperty, VerifyError> {
    let raw = &caps[1];
    let name = if raw.starts_with('\'') { unquote(raw)? } else { raw.to_string() };
    Ok(InterfaceProperty { name, optional: caps.get(2).is_some(), ty: caps[3].to_string() })
}

/// Undo key quoting: `\'` back to `'`, everything else as a JSON string escape.
pub fn unquote(quoted: &str) -> Result<String, VerifyError> {
    let bad = |reason: &str| VerifyError::BadQuotedKey { key: quoted.to_string(), reason: reason.to_string() };
    let inner = quoted
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or_else(|| bad("missing quotes"))?;

    let mut json = String::with_capacity(inner.len() + 2);
    json.push('"');
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => json.push('\''),
                Some(other) => {
                    json.push('\\');
                    json.push(other);
                }
                None => return Err(bad("dangling escape")),
            },
            '"' => json.push_str("\\\""),
            other => json.push(other),
        }
    }
    json.push('"');
    serde_json::from_str(&json).map_err(|e| bad(&e.to_string()))
}

/// Every `interface` block in `text`, in order.
pub fn parse_types(text: &str) -> Result<Vec<ParsedInterface>, VerifyError> {
    INTERFACE
        .captures_iter(text)
        .map(|caps| {
            let properties = PROPERTY
                .captures_iter(&caps[3])
                .map(|p| property_from_captures(&p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedInterface { name: caps[2].to_string(), exported: caps.get(1).is_some(), properties })
        })
        .collect()
}

/// Every `type X = T;` statement in `text`, in order.
pub fn parse_aliases(text: &str) -> Vec<ParsedAlias> {
    ALIAS
        .captures_iter(text)
        .map(|caps| ParsedAlias {
            name: caps[2].to_string(),
            exported: caps.get(1).is_some(),
            ty: caps[3].to_string(),
        })
        .collect()
}

/// Strict line-by-line check: only blank lines, `//` comments, aliases and
/// interface blocks are accepted.
pub fn verify(text: &str) -> Result<Declarations, VerifyError> {
    let mut out = Declarations::default();
    let mut open: Option<ParsedInterface> = None;

    for (n, line) in text.lines().enumerate() {
        let unrecognized = || VerifyError::UnrecognizedLine { line: n + 1, text: line.to_string() };

        if let Some(interface) = open.as_mut() {
            if line == "}" {
                out.interfaces.extend(open.take());
            } else if line.is_empty() && interface.properties.is_empty() {
                // body line of an empty interface
            } else {
                let caps = PROPERTY.captures(line).ok_or_else(unrecognized)?;
                interface.properties.push(property_from_captures(&caps)?);
            }
            continue;
        }

        if line.trim().is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(caps) = INTERFACE_HEADER.captures(line) {
            open = Some(ParsedInterface {
                name: caps[2].to_string(),
                exported: caps.get(1).is_some(),
                properties: Vec::new(),
            });
            continue;
        }
        let caps = ALIAS.captures(line).ok_or_else(unrecognized)?;
        out.aliases.push(ParsedAlias {
            name: caps[2].to_string(),
            exported: caps.get(1).is_some(),
            ty: caps[3].to_string(),
        });
    }

    match open {
        Some(interface) => Err(VerifyError::UnterminatedInterface { name: interface.name }),
        None => Ok(out),
    }
}

/// Type names used in property or alias types that nothing declares.
pub fn undefined_references(decls: &Declarations) -> Vec<String> {
    let declared: Vec<&str> = decls
        .interfaces
        .iter()
        .map(|i| i.name.as_str())
        .chain(decls.aliases.iter().map(|a| a.name.as_str()))
        .collect();
    let used = decls
        .interfaces
        .iter()
        .flat_map(|i| i.properties.iter().map(|p| p.ty.as_str()))
        .chain(decls.aliases.iter().map(|a| a.ty.as_str()));

    let mut missing: Vec<String> = Vec::new();
    for ty in used {
        for ident in IDENT.find_iter(ty).map(|m| m.as_str()) {
            if !BUILTIN_TYPES.contains(&ident) && !declared.contains(&ident) && !missing.iter().any(|m| m == ident) {
                missing.push(ident.to_string());
            }
        }
    }
    missing
}
