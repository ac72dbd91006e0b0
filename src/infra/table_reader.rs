use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::{debug, warn};

use super::table::{Cell, FileExt, Table};
use crate::common::error::{AnalysisError, Result};

/// Read `path` as a table if its extension is one of `allowed`.
///
/// Never fails: unsupported, unreadable or malformed files come back as an
/// empty table and the problem is logged as a warning.
pub fn read_table(path: &Path, allowed: &[FileExt]) -> Table {
    let ext = match FileExt::from_path(path) {
        Some(ext) if allowed.contains(&ext) => ext,
        _ => {
            warn!("Unsupported file format for {}", path.display());
            return Table::default();
        }
    };

    let result = match ext {
        FileExt::Csv => read_csv(path),
        FileExt::Xlsx => read_xlsx(path),
    };

    match result {
        Ok(table) => {
            debug!("Read {} rows from {}", table.len(), path.display());
            table
        }
        Err(e) => {
            let err = AnalysisError::MalformedSourceFile {
                path: path.to_path_buf(),
                reason: e.to_string(),
            };
            warn!("{}", err);
            Table::default()
        }
    }
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::infer).collect());
    }

    Ok(Table::new(columns, rows))
}

fn read_xlsx(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::MalformedSourceFile {
            path: path.to_path_buf(),
            reason: "workbook has no worksheets".to_string(),
        })??;

    let mut sheet_rows = range.rows();
    let columns = match sheet_rows.next() {
        Some(header) => header.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Ok(Table::default()),
    };
    let rows = sheet_rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    Ok(Table::new(columns, rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(text) if text.trim().is_empty() => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(number) => Cell::Number(*number),
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Bool(flag) => Cell::Bool(*flag),
        other => Cell::Text(other.to_string()),
    }
}
