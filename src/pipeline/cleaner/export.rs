use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::Cleaner;
use crate::common::constants::{EDGE_LIST_SUFFIX, VERTEX_LIST_SUFFIX};
use crate::common::error::{AnalysisError, Result};
use crate::infra::{write_table, Cell, FileExt};
use crate::registry::InstitutionSource;

const VERTEX_HEADERS: [&str; 5] = ["id", "name", "alias", "country", "rank"];
const EDGE_HEADERS: [&str; 3] = ["source", "target", "weight"];

/// Paths written by one field export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFiles {
    pub vertex_list: PathBuf,
    pub edge_list: PathBuf,
}

impl Cleaner {
    /// Write this field's placement graph as a vertex list and an edge list
    pub fn export_vertex_and_edge_list_as(
        &self,
        format: FileExt,
        dir: &Path,
        source: &dyn InstitutionSource,
    ) -> Result<ExportedFiles> {
        let name = self
            .field()
            .as_name()
            .ok_or_else(|| AnalysisError::InvalidField(format!("cannot export non-text field {}", self.field())))?;
        let stem = file_stem(name);
        let ranking = self.current_ranking();

        let mut vertex_rows = Vec::with_capacity(self.vertices.len());
        for id in &self.vertices {
            let institution = source.get_existing_institution(*id)?;
            let info = institution.info();
            let rank = ranking
                .rank_of(*id)
                .map(|r| Cell::Number(r as f64))
                .unwrap_or(Cell::Empty);
            vertex_rows.push(vec![
                Cell::Number(id.0 as f64),
                Cell::Text(info.name.clone()),
                Cell::Text(info.alias.clone()),
                Cell::Text(info.country.clone()),
                rank,
            ]);
        }

        let edge_rows: Vec<Vec<Cell>> = self
            .edges
            .iter()
            .map(|((src, dst), weight)| {
                vec![
                    Cell::Number(src.0 as f64),
                    Cell::Number(dst.0 as f64),
                    Cell::Number(*weight as f64),
                ]
            })
            .collect();

        let files = ExportedFiles {
            vertex_list: dir.join(format!("{}_{}.{}", stem, VERTEX_LIST_SUFFIX, format)),
            edge_list: dir.join(format!("{}_{}.{}", stem, EDGE_LIST_SUFFIX, format)),
        };

        write_table(&files.vertex_list, format, &VERTEX_HEADERS, &vertex_rows)?;
        write_table(&files.edge_list, format, &EDGE_HEADERS, &edge_rows)?;

        info!(
            "Exported {} ({} vertices, {} edges) as {}",
            name,
            vertex_rows.len(),
            edge_rows.len(),
            format
        );
        Ok(files)
    }
}

// Spaces become `_`; other non-alphanumerics are percent-encoded so that
// distinct field names never share a stem.
fn file_stem(field: &str) -> String {
    let mut stem = String::with_capacity(field.len());
    for c in field.chars() {
        if c.is_alphanumeric() {
            stem.push(c);
        } else if c == ' ' {
            stem.push('_');
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                stem.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    stem
}
