use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileExt {
    Xlsx,
    Csv,
}

impl FileExt {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileExt::Xlsx => "xlsx",
            FileExt::Csv => "csv",
        }
    }

    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for FileExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileExt {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" => Ok(FileExt::Xlsx),
            "csv" => Ok(FileExt::Csv),
            other => Err(format!("unsupported file extension: {}", other)),
        }
    }
}

/// A single typed cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Infer a cell from raw delimited text
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Cell::Number(number),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(text) => f.write_str(text),
            Cell::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            Cell::Number(number) => write!(f, "{}", number),
            Cell::Bool(flag) => write!(f, "{}", flag),
        }
    }
}

/// A row-and-column table with a single header row
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), Cell::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(|row| row.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ext_parsing() {
        assert_eq!("XLSX".parse::<FileExt>(), Ok(FileExt::Xlsx));
        assert_eq!(".csv".parse::<FileExt>(), Ok(FileExt::Csv));
        assert!("txt".parse::<FileExt>().is_err());
        assert_eq!(FileExt::from_path(Path::new("data/faculty.Xlsx")), Some(FileExt::Xlsx));
        assert_eq!(FileExt::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_cell_inference_and_display() {
        assert_eq!(Cell::infer("  "), Cell::Empty);
        assert_eq!(Cell::infer("12"), Cell::Number(12.0));
        assert_eq!(Cell::infer("MIT"), Cell::Text("MIT".to_string()));
        assert_eq!(Cell::Number(12.0).to_string(), "12");
        assert_eq!(Cell::Number(0.5).to_string(), "0.5");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::new(
            vec!["A".to_string(), "B".to_string()],
            vec![vec![Cell::Text("x".to_string())]],
        );
        assert_eq!(table.rows[0], vec![Cell::Text("x".to_string()), Cell::Empty]);
    }
}
