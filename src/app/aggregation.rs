//! Field-level and cross-field statistics over cleaned data.
//!
//! Every query here requires a completed cleaning pass. Cross-field queries
//! visit fields in the order they were first seen.

use indexmap::IndexMap;
use tracing::{error, info, warn};

use super::analyzer::Analyzer;
use crate::common::error::{AnalysisError, Result};
use crate::domain::{FieldKey, Gender};
use crate::infra::FileExt;
use crate::pipeline::cleaner::{Cleaner, ExportedFiles, MvrRanking};

impl Analyzer {
    pub fn gini_for(&self, field: impl Into<FieldKey>) -> Result<f64> {
        self.require_cleaned()?;
        let field = field.into();
        self.registered(&field)?.calc_gini_coeff()
    }

    /// Gini coefficient of every field; a field that cannot produce one
    /// reports `0.0`
    pub fn gini_for_all(&self) -> Result<IndexMap<FieldKey, f64>> {
        self.require_cleaned()?;

        let mut results = IndexMap::with_capacity(self.cleaners.len());
        for (field, cleaner) in self.cleaners.iter() {
            let gini = cleaner.calc_gini_coeff().unwrap_or_else(|e| {
                error!("Gini coefficient for {} failed: {}", field, e);
                0.0
            });
            results.insert(field.clone(), gini);
        }
        Ok(results)
    }

    pub fn mvr_rank_for(&mut self, field: impl Into<FieldKey>) -> Result<MvrRanking> {
        let field = field.into();
        if !field.is_name() {
            error!("Field key {} is not a field name", field);
            return Err(AnalysisError::InvalidField(field.to_string()));
        }
        self.require_cleaned()?;

        match self.cleaners.get_mut(&field) {
            Some(cleaner) => cleaner.calc_mvr_rank(),
            None => Err(unregistered(&field)),
        }
    }

    /// Rank every field. Keeps going past failures; true only if all succeed.
    pub fn mvr_rank_for_all(&mut self) -> Result<bool> {
        self.require_cleaned()?;

        let mut all_ok = true;
        for (field, cleaner) in self.cleaners.iter_mut() {
            if let Err(e) = cleaner.calc_mvr_rank() {
                error!("MVR rank for {} failed: {}", field, e);
                all_ok = false;
            }
        }
        Ok(all_ok)
    }

    pub fn avg_move_by_gender(&self, gender: Gender) -> Result<IndexMap<FieldKey, Option<f64>>> {
        self.require_cleaned()?;
        Ok(self.per_field(|cleaner| cleaner.calc_avg_mvr_move_based_on_gender(gender)))
    }

    pub fn avg_move_by_gender_for_field(&mut self, gender: Gender, field: impl Into<FieldKey>) -> Result<Option<f64>> {
        self.require_cleaned()?;
        let field = field.into();
        Ok(self
            .lazy_cleaner(&field)
            .and_then(|cleaner| cleaner.calc_avg_mvr_move_based_on_gender(gender)))
    }

    pub fn avg_move_for_percentile_range(&self, low: u32, high: u32) -> Result<IndexMap<FieldKey, Option<f64>>> {
        self.require_cleaned()?;
        Ok(self.per_field(|cleaner| cleaner.calc_avg_mvr_move_for_range(low, high)))
    }

    pub fn avg_move_for_percentile_range_for_field(
        &mut self,
        low: u32,
        high: u32,
        field: impl Into<FieldKey>,
    ) -> Result<Option<f64>> {
        self.require_cleaned()?;
        let field = field.into();
        Ok(self
            .lazy_cleaner(&field)
            .and_then(|cleaner| cleaner.calc_avg_mvr_move_for_range(low, high)))
    }

    /// Export one field's vertex and edge lists into the export directory
    pub fn export_for(&self, field: impl Into<FieldKey>, format: FileExt) -> Result<ExportedFiles> {
        self.require_cleaned()?;
        let field = field.into();
        self.registered(&field)?
            .export_vertex_and_edge_list_as(format, &self.config.export_dir, &self.institutions)
    }

    /// Export every named field and return how many were written.
    /// Code-keyed fields are skipped; per-field failures are logged.
    pub fn export_for_all(&self, format: FileExt) -> Result<usize> {
        self.require_cleaned()?;

        let mut exported = 0;
        for (field, cleaner) in self.cleaners.iter() {
            if !field.is_name() {
                warn!("Skipping export of non-text field key {}", field);
                continue;
            }
            match cleaner.export_vertex_and_edge_list_as(format, &self.config.export_dir, &self.institutions) {
                Ok(_) => exported += 1,
                Err(e) => error!("Export of {} failed: {}", field, e),
            }
        }

        info!("Exported {} of {} fields as {}", exported, self.cleaners.len(), format);
        Ok(exported)
    }

    fn registered(&self, field: &FieldKey) -> Result<&Cleaner> {
        self.cleaners.get(field).ok_or_else(|| unregistered(field))
    }

    // Unknown fields are logged and then created empty
    fn lazy_cleaner(&mut self, field: &FieldKey) -> Option<&mut Cleaner> {
        if !self.cleaners.has(field) {
            error!("No Cleaner registered for {}", field);
        }
        self.cleaners.get_or_create(Some(field))
    }

    fn per_field<T>(&self, query: impl Fn(&Cleaner) -> T) -> IndexMap<FieldKey, T> {
        self.cleaners
            .iter()
            .map(|(field, cleaner)| (field.clone(), query(cleaner)))
            .collect()
    }
}

fn unregistered(field: &FieldKey) -> AnalysisError {
    error!("No Cleaner registered for {}", field);
    AnalysisError::InvalidField(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CleaningState;
    use crate::config::AnalyzerConfig;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "Name,Gender,Department,Current Institution,Current Region,Degree,Institution,Region";

    fn cleaned_analyzer(rows: &[&str]) -> (Analyzer, TempDir) {
        let dir = tempdir().unwrap();
        let source = dir.path().join("dirty");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("faculty.csv"), format!("{}\n{}\n", HEADER, rows.join("\n"))).unwrap();

        let config = AnalyzerConfig {
            source_dir: source,
            export_dir: dir.path().join("export"),
            accepted_extensions: vec![FileExt::Csv],
            ..AnalyzerConfig::default()
        };
        let mut analyzer = Analyzer::new(config);
        analyzer.clean_data().unwrap();
        (analyzer, dir)
    }

    fn sample() -> (Analyzer, TempDir) {
        cleaned_analyzer(&[
            "A,F,Physics,Stanford,USA,PhD,MIT,USA",
            "B,M,Physics,Berkeley,USA,PhD,MIT,USA",
            "C,F,Physics,Berkeley,USA,PhD,Stanford,USA",
            "D,M,Chemistry,Caltech,USA,PhD,Caltech,USA",
        ])
    }

    #[test]
    fn test_queries_before_cleaning_are_denied() {
        let dir = tempdir().unwrap();
        let mut analyzer = Analyzer::new(AnalyzerConfig {
            export_dir: dir.path().join("export"),
            ..AnalyzerConfig::default()
        });

        assert!(matches!(analyzer.gini_for("Physics"), Err(AnalysisError::PreconditionNotMet)));
        assert!(matches!(analyzer.mvr_rank_for("Physics"), Err(AnalysisError::PreconditionNotMet)));
        assert!(matches!(
            analyzer.avg_move_by_gender_for_field(Gender::Female, "Physics"),
            Err(AnalysisError::PreconditionNotMet)
        ));
        assert!(matches!(
            analyzer.avg_move_for_percentile_range(0, 100),
            Err(AnalysisError::PreconditionNotMet)
        ));
        assert!(matches!(
            analyzer.avg_move_for_percentile_range_for_field(0, 100, "Physics"),
            Err(AnalysisError::PreconditionNotMet)
        ));
        assert!(matches!(
            analyzer.export_for("Physics", FileExt::Csv),
            Err(AnalysisError::PreconditionNotMet)
        ));
        assert!(analyzer.export_for_all(FileExt::Csv).is_err());
        assert!(!analyzer.has_cleaner(&FieldKey::from("Physics")));
        assert!(!analyzer.config().export_dir.exists());
        assert_eq!(analyzer.state(), CleaningState::Uncleaned);
    }

    #[test]
    fn test_similar_field_names_export_to_separate_files() {
        let (analyzer, dir) = cleaned_analyzer(&[
            "A,F,Computer Science,Stanford,USA,PhD,MIT,USA",
            "B,M,Computer-Science,Berkeley,USA,PhD,MIT,USA",
        ]);

        assert_eq!(analyzer.export_for_all(FileExt::Csv).unwrap(), 2);
        assert_eq!(fs::read_dir(dir.path().join("export")).unwrap().count(), 4);
    }

    #[test]
    fn test_code_key_is_rejected_before_state_check() {
        let mut analyzer = Analyzer::new(AnalyzerConfig::default());
        let result = analyzer.mvr_rank_for(FieldKey::Code("42".to_string()));
        assert!(matches!(result, Err(AnalysisError::InvalidField(_))));
    }

    #[test]
    fn test_unregistered_field_is_invalid() {
        let (mut analyzer, _dir) = sample();

        assert!(matches!(analyzer.gini_for("Biology"), Err(AnalysisError::InvalidField(_))));
        assert!(matches!(analyzer.mvr_rank_for("Biology"), Err(AnalysisError::InvalidField(_))));
        assert!(!analyzer.has_cleaner(&FieldKey::from("Biology")));
    }

    #[test]
    fn test_gini_for_all_covers_every_field_in_order() {
        let (analyzer, _dir) = sample();

        let gini = analyzer.gini_for_all().unwrap();
        let keys: Vec<_> = gini.keys().cloned().collect();

        assert_eq!(keys, vec![FieldKey::from("Physics"), FieldKey::from("Chemistry")]);
        assert!((gini[&FieldKey::from("Physics")] - 4.0 / 9.0).abs() < 1e-9);
        assert_eq!(analyzer.gini_for("Chemistry").unwrap(), 0.0);
    }

    #[test]
    fn test_mvr_rank_for_all_ranks_each_field() {
        let (mut analyzer, _dir) = sample();

        assert!(analyzer.mvr_rank_for_all().unwrap());
        let ranking = analyzer.mvr_rank_for("Physics").unwrap();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking.violations, 0);
    }

    #[test]
    fn test_gender_moves_per_field() {
        let (mut analyzer, _dir) = sample();

        let moves = analyzer.avg_move_by_gender(Gender::Female).unwrap();
        assert_eq!(moves[&FieldKey::from("Physics")], Some(1.0));
        assert_eq!(moves[&FieldKey::from("Chemistry")], None);

        assert_eq!(
            analyzer.avg_move_by_gender_for_field(Gender::Male, "Physics").unwrap(),
            Some(2.0)
        );
    }

    #[test]
    fn test_unknown_field_is_created_lazily_with_degenerate_result() {
        let (mut analyzer, _dir) = sample();

        let result = analyzer.avg_move_for_percentile_range_for_field(0, 100, "Biology").unwrap();

        assert_eq!(result, None);
        assert!(analyzer.has_cleaner(&FieldKey::from("Biology")));
    }

    #[test]
    fn test_percentile_band_per_field() {
        let (analyzer, _dir) = sample();

        let moves = analyzer.avg_move_for_percentile_range(0, 33).unwrap();
        assert_eq!(moves[&FieldKey::from("Physics")], Some(1.5));
    }

    #[test]
    fn test_export_for_writes_into_export_dir() {
        let (analyzer, dir) = sample();

        let files = analyzer.export_for("Physics", FileExt::Csv).unwrap();

        assert_eq!(files.edge_list, dir.path().join("export").join("Physics_edge_list.csv"));
        assert!(files.vertex_list.exists());
        assert_eq!(analyzer.export_for_all(FileExt::Csv).unwrap(), 2);
    }
}
