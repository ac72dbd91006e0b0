use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::debug;

use super::table::{Cell, FileExt};
use crate::common::error::Result;

/// Write a header row plus `rows` to `path` in the requested format
pub fn write_table(path: &Path, format: FileExt, headers: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        FileExt::Csv => write_csv(path, headers, rows)?,
        FileExt::Xlsx => write_xlsx(path, headers, rows)?,
    }

    debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(path: &Path, headers: &[&str], rows: &[Vec<Cell>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (row_index, row) in rows.iter().enumerate() {
        let row_num = row_index as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(number) => {
                    sheet.write_number(row_num, col, *number)?;
                }
                Cell::Bool(flag) => {
                    sheet.write_boolean(row_num, col, *flag)?;
                }
                Cell::Text(text) => {
                    sheet.write_string(row_num, col, text.as_str())?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::read_table;
    use tempfile::tempdir;

    #[test]
    fn test_csv_output_is_readable_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("edges.csv");
        let rows = vec![vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]];

        write_table(&path, FileExt::Csv, &["source", "target", "weight"], &rows).unwrap();

        let table = read_table(&path, &[FileExt::Csv]);
        assert_eq!(table.columns, vec!["source", "target", "weight"]);
        assert_eq!(table.rows, rows);
    }

    #[test]
    fn test_xlsx_output_is_readable_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vertices.xlsx");
        let rows = vec![vec![Cell::Number(1.0), Cell::Text("MIT".to_string())]];

        write_table(&path, FileExt::Xlsx, &["id", "name"], &rows).unwrap();

        let table = read_table(&path, &[FileExt::Xlsx]);
        assert_eq!(table.columns, vec!["id", "name"]);
        assert_eq!(table.rows, rows);
    }
}
