use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_.\-]+").expect("valid separator regex"));

/// How a requested column name is compared with the sheet headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Headers must equal the name after trimming
    Exact,
    /// Case-insensitive containment after collapsing separators
    Approx,
}

/// Collapse whitespace, underscores, dots and dashes into single spaces and lowercase
pub fn normalize_label(label: &str) -> String {
    SEPARATORS.replace_all(label.trim(), " ").trim().to_lowercase()
}

/// Locates columns in a sheet whose header repeats a block of degree columns.
///
/// The header is split at every anchor column (normally `Degree`): the
/// columns before the first anchor describe the person, and each anchor
/// starts one degree block that runs until the next anchor.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    columns: Vec<String>,
    normalized: Vec<String>,
    anchors: Vec<usize>,
}

impl ColumnResolver {
    pub fn new(columns: &[String], anchor: &str) -> Self {
        let normalized: Vec<String> = columns.iter().map(|c| normalize_label(c)).collect();
        let anchor = normalize_label(anchor);
        let anchors = normalized
            .iter()
            .enumerate()
            .filter(|(_, header)| is_anchor(header, &anchor))
            .map(|(index, _)| index)
            .collect();

        Self {
            columns: columns.to_vec(),
            normalized,
            anchors,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of the first column matching `name` anywhere in the header
    pub fn find_first_index(&self, name: &str, mode: MatchMode) -> Option<usize> {
        self.find_in(0..self.columns.len(), name, mode)
    }

    /// Index of the first column matching `name` inside `range`
    pub fn find_in(&self, range: Range<usize>, name: &str, mode: MatchMode) -> Option<usize> {
        let wanted = normalize_label(name);
        let end = range.end.min(self.columns.len());
        (range.start..end).find(|&index| match mode {
            MatchMode::Exact => self.columns[index].trim() == name.trim(),
            MatchMode::Approx => self.normalized[index].contains(&wanted),
        })
    }

    /// Columns describing the person, before the first degree block
    pub fn person_columns(&self) -> Range<usize> {
        0..self.anchors.first().copied().unwrap_or(self.columns.len())
    }

    /// Column ranges of each repeated degree block, in header order
    pub fn degree_blocks(&self) -> Vec<Range<usize>> {
        self.anchors
            .iter()
            .enumerate()
            .map(|(i, &start)| {
                let end = self.anchors.get(i + 1).copied().unwrap_or(self.columns.len());
                start..end
            })
            .collect()
    }
}

// "Degree", "Degree 2" and pandas-style "Degree.1" all start a block
fn is_anchor(header: &str, anchor: &str) -> bool {
    match header.strip_prefix(anchor) {
        Some(rest) => rest.is_empty() || rest.trim().chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
