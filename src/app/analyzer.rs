use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::common::constants::LOCK_FILE_PREFIX;
use crate::common::error::{AnalysisError, Result};
use crate::config::AnalyzerConfig;
use crate::domain::{FieldKey, InstId, InstInfo, Institution, KeyTriple};
use crate::infra::{read_table, FileExt};
use crate::pipeline::cleaner::Cleaner;
use crate::pipeline::columns::{ColumnResolver, MatchMode};
use crate::registry::{CleanerRegistry, InstIdRegistry, InstitutionAccess, InstitutionStore};

/// Whether a full cleaning pass has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CleaningState {
    Uncleaned,
    Cleaned,
}

/// Outcome of loading an institution ID dictionary
#[derive(Debug, Default, Clone, Serialize)]
pub struct PreloadReport {
    pub rows: usize,
    pub allocated: usize,
    pub duplicates: Vec<KeyTriple>,
}

impl PreloadReport {
    /// Every row allocated a fresh ID
    pub fn succeeded(&self) -> bool {
        self.rows > 0 && self.duplicates.is_empty()
    }
}

/// Counters for one directory-level cleaning pass
#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub files_seen: usize,
    pub files_skipped: usize,
    pub files_cleaned: usize,
    pub rows_dispatched: usize,
    pub rows_skipped: usize,
    pub fields: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CleaningSummary {
    fn new() -> Self {
        Self {
            files_seen: 0,
            files_skipped: 0,
            files_cleaned: 0,
            rows_dispatched: 0,
            rows_skipped: 0,
            fields: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|end| end - self.started_at)
    }
}

/// Owns the institution registries and the per-field cleaners, runs the
/// cleaning pass and answers the aggregate queries (see `aggregation`).
#[derive(Debug)]
pub struct Analyzer {
    pub(crate) config: AnalyzerConfig,
    pub(crate) ids: InstIdRegistry,
    pub(crate) institutions: InstitutionStore,
    pub(crate) cleaners: CleanerRegistry,
    pub(crate) state: CleaningState,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            ids: InstIdRegistry::new(),
            institutions: InstitutionStore::new(),
            cleaners: CleanerRegistry::new(),
            state: CleaningState::Uncleaned,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn state(&self) -> CleaningState {
        self.state
    }

    pub fn is_cleaned(&self) -> bool {
        self.state == CleaningState::Cleaned
    }

    pub(crate) fn require_cleaned(&self) -> Result<()> {
        if self.is_cleaned() {
            Ok(())
        } else {
            error!("Attempt denied. Data are not cleaned yet.");
            Err(AnalysisError::PreconditionNotMet)
        }
    }

    /// Resolve `info` and register it under `field`
    pub fn get_institution(&mut self, info: &mut InstInfo, field: &FieldKey) -> &Institution {
        let id = match info.inst_id {
            Some(id) => id,
            None => self.ids.resolve(&info.key_triple()),
        };
        info.inst_id = Some(id);
        self.institutions.get_or_create(id, info, field)
    }

    pub fn get_existing_institution(&self, id: InstId) -> Result<&Institution> {
        self.institutions.get_existing(id)
    }

    pub fn institutions(&self) -> &InstitutionStore {
        &self.institutions
    }

    pub fn print_all_institutions(&self) {
        self.institutions.print_all();
    }

    pub fn inst_ids(&self) -> &InstIdRegistry {
        &self.ids
    }

    pub fn inst_id_for(&mut self, info: &InstInfo) -> InstId {
        self.ids.resolve(&info.key_triple())
    }

    pub fn inst_id_for_init(&mut self, key: KeyTriple) -> bool {
        self.ids.preload(key)
    }

    /// Cleaner for `field`, created on first reference
    pub fn get_cleaner_for(&mut self, field: Option<&FieldKey>) -> Option<&mut Cleaner> {
        self.cleaners.get_or_create(field)
    }

    pub fn cleaner(&self, field: &FieldKey) -> Option<&Cleaner> {
        self.cleaners.get(field)
    }

    pub fn has_cleaner(&self, field: &FieldKey) -> bool {
        self.cleaners.has(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldKey> {
        self.cleaners.keys()
    }

    /// Seed the ID registry from a dictionary whose first three columns are
    /// the key triple. Rows applied before a duplicate stay applied.
    pub fn load_inst_ids_from(&mut self, path: &Path) -> PreloadReport {
        let table = read_table(path, &[FileExt::Xlsx, FileExt::Csv]);
        let mut report = PreloadReport::default();

        if table.is_empty() {
            warn!("Failed to Initialize InstID Dictionary from {}", path.display());
            return report;
        }

        for row in table.rows() {
            let part = |i: usize| row.get(i).map(|c| c.to_string()).unwrap_or_default();
            let key = KeyTriple::new(part(0), part(1), part(2));

            report.rows += 1;
            if self.ids.preload(key.clone()) {
                report.allocated += 1;
            } else {
                report.duplicates.push(key);
            }
        }

        if report.succeeded() {
            info!("Loaded {} institution IDs from {}", report.allocated, path.display());
        } else {
            warn!(
                "Failed to Initialize InstID Dictionary: {} duplicate rows in {}",
                report.duplicates.len(),
                path.display()
            );
        }
        report
    }

    /// Clean every accepted sheet in the configured source directory.
    ///
    /// A missing directory is fatal. Unreadable sheets are skipped. The pass
    /// is not idempotent: running it twice feeds every row to the cleaners
    /// again.
    pub fn clean_data(&mut self) -> Result<CleaningSummary> {
        info!("🚀 Start Cleaning Data");

        let source_dir = self.config.source_dir.clone();
        if !source_dir.is_dir() {
            let err = AnalysisError::MissingSourceDirectory(source_dir);
            error!(severity = "critical", "{}", err);
            return Err(err);
        }

        let mut entries: Vec<_> = fs::read_dir(&source_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        entries.sort();

        let mut summary = CleaningSummary::new();
        for path in entries {
            summary.files_seen += 1;

            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if file_name.starts_with(LOCK_FILE_PREFIX) {
                debug!("Skipping lock file {}", file_name);
                summary.files_skipped += 1;
                continue;
            }

            match FileExt::from_path(&path) {
                Some(ext) if self.config.accepted_extensions.contains(&ext) => {}
                _ => {
                    debug!("Skipping {} (extension not accepted)", file_name);
                    summary.files_skipped += 1;
                    continue;
                }
            }

            let (dispatched, skipped) = self.clean_file(&path);
            summary.files_cleaned += 1;
            summary.rows_dispatched += dispatched;
            summary.rows_skipped += skipped;
        }

        self.state = CleaningState::Cleaned;
        summary.fields = self.cleaners.len();
        summary.completed_at = Some(Utc::now());

        info!(
            "✅ Data are Cleaned Now! {} files, {} rows dispatched, {} rows skipped, {} fields",
            summary.files_cleaned, summary.rows_dispatched, summary.rows_skipped, summary.fields
        );
        Ok(summary)
    }

    // Returns (rows dispatched to a cleaner, rows without a field)
    fn clean_file(&mut self, path: &Path) -> (usize, usize) {
        let table = read_table(path, &self.config.accepted_extensions);
        let columns = ColumnResolver::new(&table.columns, &self.config.anchor_column);
        let department = columns.find_first_index(&self.config.department_column, MatchMode::Approx);

        if department.is_none() && !table.is_empty() {
            warn!(
                "No {} column in {}; its rows are skipped",
                self.config.department_column,
                path.display()
            );
        }

        let mut dispatched = 0;
        let mut skipped = 0;
        for row in table.rows() {
            let field = department
                .and_then(|i| row.get(i))
                .and_then(FieldKey::from_cell);

            match self.cleaners.get_or_create(field.as_ref()) {
                Some(cleaner) => {
                    let mut access = InstitutionAccess {
                        ids: &mut self.ids,
                        store: &mut self.institutions,
                    };
                    cleaner.clean_row(row, &columns, &mut access);
                    dispatched += 1;
                }
                None => skipped += 1,
            }
        }

        info!("{} is Cleaned", path.display());
        (dispatched, skipped)
    }
}
