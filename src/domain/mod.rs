//! Domain shapes shared by the registries, the cleaners and the reports.

pub mod field;
pub mod institution;

pub use field::FieldKey;
pub use institution::{normalize_text, InstId, InstInfo, Institution, KeyTriple};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender category recorded for an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Parse the free-form gender cell used by the survey sheets
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "m" | "male" | "man" => Gender::Male,
            "f" | "female" | "woman" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        };
        f.write_str(label)
    }
}
