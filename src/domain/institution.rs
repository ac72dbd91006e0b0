use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::FieldKey;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Trim and collapse internal whitespace runs to a single space.
///
/// Every institution name, alias and country goes through this before it
/// becomes part of a key, whether it comes from a sheet or a dictionary.
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// Stable institution identifier, allocated from 1 in first-seen order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

impl fmt::Display for InstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identity of an institution: (name, alternate name, country).
/// Equality is positional, so ("A", "B", "C") and ("B", "A", "C") differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyTriple(pub String, pub String, pub String);

impl KeyTriple {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, country: impl Into<String>) -> Self {
        KeyTriple(
            normalize_text(&name.into()),
            normalize_text(&alias.into()),
            normalize_text(&country.into()),
        )
    }
}

impl fmt::Display for KeyTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Institution details extracted from a row, before and after ID resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstInfo {
    /// Assigned by the identity registry; `None` until resolved
    pub inst_id: Option<InstId>,
    pub name: String,
    pub alias: String,
    pub country: String,
}

impl InstInfo {
    pub fn new(name: impl Into<String>, alias: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            inst_id: None,
            name: name.into(),
            alias: alias.into(),
            country: country.into(),
        }
    }

    pub fn key_triple(&self) -> KeyTriple {
        KeyTriple::new(self.name.clone(), self.alias.clone(), self.country.clone())
    }
}

/// An institution and the fields it has been seen in
#[derive(Debug, Clone)]
pub struct Institution {
    info: InstInfo,
    fields: BTreeSet<FieldKey>,
}

impl Institution {
    pub fn new(info: InstInfo) -> Self {
        Self {
            info,
            fields: BTreeSet::new(),
        }
    }

    pub fn info(&self) -> &InstInfo {
        &self.info
    }

    pub fn id(&self) -> Option<InstId> {
        self.info.inst_id
    }

    /// Register membership in `field`; returns false if it was already known
    pub fn get_field(&mut self, field: &FieldKey) -> bool {
        if self.fields.contains(field) {
            return false;
        }
        self.fields.insert(field.clone())
    }

    pub fn has_field(&self, field: &FieldKey) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.iter()
    }

    pub fn print_info(&self) {
        println!("{}", self);
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .info
            .inst_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let fields: Vec<String> = self.fields.iter().map(|f| f.to_string()).collect();
        write!(
            f,
            "[{}] {} / {} / {} | fields: {}",
            id,
            self.info.name,
            self.info.alias,
            self.info.country,
            fields.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_triple_is_order_sensitive() {
        let a = KeyTriple::new("MIT", "Massachusetts", "USA");
        let b = KeyTriple::new("Massachusetts", "MIT", "USA");
        assert_ne!(a, b);
        assert_eq!(a, InstInfo::new("MIT", "Massachusetts", "USA").key_triple());
    }

    #[test]
    fn test_key_triple_collapses_whitespace() {
        let spaced = KeyTriple::new(" Seoul  National\tUniversity ", "", "KR ");
        assert_eq!(spaced, KeyTriple::new("Seoul National University", "", "KR"));
    }

    #[test]
    fn test_get_field_is_idempotent() {
        let mut inst = Institution::new(InstInfo::new("KAIST", "", "KR"));
        let physics = FieldKey::from("Physics");

        assert!(inst.get_field(&physics));
        assert!(!inst.get_field(&physics));
        assert_eq!(inst.fields().count(), 1);
        assert!(inst.has_field(&physics));
    }

    #[test]
    fn test_display_lists_fields() {
        let mut info = InstInfo::new("KAIST", "Korea Advanced Institute", "KR");
        info.inst_id = Some(InstId(3));
        let mut inst = Institution::new(info);
        inst.get_field(&FieldKey::from("Physics"));

        assert_eq!(
            inst.to_string(),
            "[3] KAIST / Korea Advanced Institute / KR | fields: Physics"
        );
    }
}
