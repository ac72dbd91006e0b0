use serde::{Serialize, Serializer};
use std::fmt;

use crate::infra::Cell;

/// Key of an academic field as it was read from the Department column.
///
/// Spreadsheets occasionally carry numeric department codes instead of
/// names. Those cells still produce a cleaner, but they are kept apart as
/// `Code` so that name-only operations (ranking, export) can reject them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Name(String),
    Code(String),
}

impl FieldKey {
    /// Build a key from a Department cell; empty cells yield `None`
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(FieldKey::Name(trimmed.to_string()))
                }
            }
            Cell::Number(_) | Cell::Bool(_) => Some(FieldKey::Code(cell.to_string())),
            Cell::Empty => None,
        }
    }

    /// The field name, if this key is a plain name
    pub fn as_name(&self) -> Option<&str> {
        match self {
            FieldKey::Name(name) => Some(name),
            FieldKey::Code(_) => None,
        }
    }

    pub fn is_name(&self) -> bool {
        matches!(self, FieldKey::Name(_))
    }

    /// Whether the key carries no usable value
    pub fn is_empty(&self) -> bool {
        match self {
            FieldKey::Name(value) | FieldKey::Code(value) => value.trim().is_empty(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Name(name) => f.write_str(name),
            FieldKey::Code(code) => write!(f, "#{}", code),
        }
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::Name(name.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(name)
    }
}

// Report maps are keyed by field, and JSON object keys must be strings
impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
