//! Per-field cleaning and analysis.
//!
//! A `Cleaner` owns every alumni record of one academic field together with
//! the placement graph built from them (doctoral institution -> current
//! institution) and the statistics derived from that graph.

pub mod export;
pub mod ranking;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use tracing::{debug, info, warn};

use crate::common::constants::{
    ALIAS_COLUMN, CURRENT_ALIAS_COLUMN, CURRENT_INSTITUTION_COLUMN, CURRENT_REGION_COLUMN,
    DOCTORAL_DEGREE_MARKERS, GENDER_COLUMN, INSTITUTION_COLUMN, NAME_COLUMN, REGION_COLUMN,
};
use crate::common::error::{AnalysisError, Result};
use crate::domain::{normalize_text, FieldKey, Gender, InstId, InstInfo};
use crate::infra::Cell;
use crate::pipeline::columns::{ColumnResolver, MatchMode};
use crate::registry::InstitutionLookup;

pub use export::ExportedFiles;
pub use ranking::{MvrRanking, PlacementEdges};

/// One cleaned row: where a person got their doctorate and where they are now
#[derive(Debug, Clone, PartialEq)]
pub struct AlumniRecord {
    pub name: String,
    pub gender: Gender,
    pub phd: InstId,
    pub current: InstId,
}

#[derive(Debug)]
pub struct Cleaner {
    field: FieldKey,
    records: Vec<AlumniRecord>,
    vertices: BTreeSet<InstId>,
    edges: PlacementEdges,
    dropped_rows: usize,
    ranking: Option<MvrRanking>,
}

impl Cleaner {
    pub fn new(field: FieldKey) -> Self {
        Self {
            field,
            records: Vec::new(),
            vertices: BTreeSet::new(),
            edges: PlacementEdges::new(),
            dropped_rows: 0,
            ranking: None,
        }
    }

    pub fn field(&self) -> &FieldKey {
        &self.field
    }

    pub fn records(&self) -> &[AlumniRecord] {
        &self.records
    }

    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edges(&self) -> &PlacementEdges {
        &self.edges
    }

    /// Clean one raw row and record the placement it describes.
    ///
    /// Returns false when the row lacks a doctoral or a current institution;
    /// such rows are counted as dropped and leave no trace in the graph.
    pub fn clean_row(&mut self, row: &[Cell], columns: &ColumnResolver, lookup: &mut dyn InstitutionLookup) -> bool {
        let person = columns.person_columns();
        let name = text_at(row, columns.find_in(person.clone(), NAME_COLUMN, MatchMode::Approx));
        let gender = Gender::parse(&text_at(row, columns.find_in(person.clone(), GENDER_COLUMN, MatchMode::Approx)));

        let current = institution_in(row, columns, person, CURRENT_INSTITUTION_COLUMN, CURRENT_ALIAS_COLUMN, CURRENT_REGION_COLUMN);
        let phd = doctoral_block(row, columns)
            .and_then(|block| institution_in(row, columns, block, INSTITUTION_COLUMN, ALIAS_COLUMN, REGION_COLUMN));

        let (mut phd, mut current) = match (phd, current) {
            (Some(phd), Some(current)) => (phd, current),
            _ => {
                debug!("Dropping row without doctoral or current institution in {}", self.field);
                self.dropped_rows += 1;
                return false;
            }
        };

        let phd_id = resolved_id(lookup, &mut phd, &self.field);
        let current_id = resolved_id(lookup, &mut current, &self.field);

        self.vertices.insert(phd_id);
        self.vertices.insert(current_id);
        *self.edges.entry((phd_id, current_id)).or_default() += 1;
        self.records.push(AlumniRecord {
            name,
            gender,
            phd: phd_id,
            current: current_id,
        });
        self.ranking = None;
        true
    }

    /// Gini coefficient of placements produced per institution
    pub fn calc_gini_coeff(&self) -> Result<f64> {
        let mut produced: BTreeMap<InstId, u32> = self.vertices.iter().map(|id| (*id, 0)).collect();
        for (&(src, _), &weight) in &self.edges {
            *produced.entry(src).or_default() += weight;
        }
        let produced: Vec<u32> = produced.into_values().collect();

        ranking::gini_coefficient(&produced)
            .ok_or_else(|| AnalysisError::EmptyDistribution(self.field.to_string()))
    }

    /// Compute and cache the minimum violation ranking of this field
    pub fn calc_mvr_rank(&mut self) -> Result<MvrRanking> {
        if self.vertices.is_empty() {
            return Err(AnalysisError::EmptyDistribution(self.field.to_string()));
        }

        let ranking = self.compute_ranking();
        info!(
            "MVR rank for {}: {} institutions, {} violations",
            self.field,
            ranking.len(),
            ranking.violations
        );
        self.ranking = Some(ranking.clone());
        Ok(ranking)
    }

    /// Mean rank change (current minus doctoral) for people of `gender`.
    /// Positive values mean people moved down the ranking.
    pub fn calc_avg_mvr_move_based_on_gender(&self, gender: Gender) -> Option<f64> {
        let ranking = self.current_ranking();
        average_move(
            &ranking,
            self.records.iter().filter(|record| record.gender == gender),
        )
    }

    /// Mean rank change for people whose doctoral institution falls in the
    /// `[low, high]` percentile band (0 is the top of the ranking)
    pub fn calc_avg_mvr_move_for_range(&self, low: u32, high: u32) -> Option<f64> {
        if low > high || high > 100 {
            warn!("Invalid percentile range [{}, {}] for {}", low, high, self.field);
            return None;
        }

        let ranking = self.current_ranking();
        let in_band = |record: &&AlumniRecord| match ranking.percentile_of(record.phd) {
            Some(pct) => pct >= low as f64 && pct <= high as f64,
            None => false,
        };
        average_move(&ranking, self.records.iter().filter(in_band))
    }

    fn current_ranking(&self) -> Cow<'_, MvrRanking> {
        match &self.ranking {
            Some(ranking) => Cow::Borrowed(ranking),
            None => Cow::Owned(self.compute_ranking()),
        }
    }

    fn compute_ranking(&self) -> MvrRanking {
        let vertices: Vec<InstId> = self.vertices.iter().copied().collect();
        ranking::minimum_violation_ranking(&vertices, &self.edges)
    }
}

fn resolved_id(lookup: &mut dyn InstitutionLookup, info: &mut InstInfo, field: &FieldKey) -> InstId {
    lookup.get_institution(info, field);
    match info.inst_id {
        Some(id) => id,
        None => lookup.inst_id_for(info),
    }
}

fn average_move<'a>(ranking: &MvrRanking, records: impl Iterator<Item = &'a AlumniRecord>) -> Option<f64> {
    let moves: Vec<f64> = records
        .filter_map(|record| {
            let phd = ranking.rank_of(record.phd)?;
            let current = ranking.rank_of(record.current)?;
            Some(current as f64 - phd as f64)
        })
        .collect();

    if moves.is_empty() {
        None
    } else {
        Some(moves.iter().sum::<f64>() / moves.len() as f64)
    }
}

/// Cell text with runs of whitespace collapsed
fn text_at(row: &[Cell], index: Option<usize>) -> String {
    index
        .and_then(|i| row.get(i))
        .map(|cell| normalize_text(&cell.to_string()))
        .unwrap_or_default()
}

fn institution_in(
    row: &[Cell],
    columns: &ColumnResolver,
    range: Range<usize>,
    name_column: &str,
    alias_column: &str,
    region_column: &str,
) -> Option<InstInfo> {
    let name = text_at(row, columns.find_in(range.clone(), name_column, MatchMode::Approx));
    if name.is_empty() {
        return None;
    }
    let alias = text_at(row, columns.find_in(range.clone(), alias_column, MatchMode::Approx));
    let country = text_at(row, columns.find_in(range, region_column, MatchMode::Approx));
    Some(InstInfo::new(name, alias, country))
}

// First degree block whose label reads as a doctorate
fn doctoral_block(row: &[Cell], columns: &ColumnResolver) -> Option<Range<usize>> {
    columns.degree_blocks().into_iter().find(|block| {
        let label = text_at(row, Some(block.start)).to_lowercase().replace(['.', ' '], "");
        DOCTORAL_DEGREE_MARKERS.iter().any(|marker| label.contains(*marker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{InstIdRegistry, InstitutionAccess, InstitutionStore};

    fn header() -> Vec<String> {
        [
            "Name",
            "Gender",
            "Department",
            "Current Institution",
            "Current Region",
            "Degree",
            "Institution",
            "Region",
            "Degree",
            "Institution",
            "Region",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn row(name: &str, gender: &str, current: &str, bs: &str, phd: &str) -> Vec<Cell> {
        let text = |s: &str| {
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.to_string())
            }
        };
        vec![
            text(name),
            text(gender),
            text("CS"),
            text(current),
            text("USA"),
            text("BS"),
            text(bs),
            text("KR"),
            text("Ph.D."),
            text(phd),
            text("USA"),
        ]
    }

    struct Fixture {
        ids: InstIdRegistry,
        store: InstitutionStore,
        cleaner: Cleaner,
        columns: ColumnResolver,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                ids: InstIdRegistry::new(),
                store: InstitutionStore::new(),
                cleaner: Cleaner::new(FieldKey::from("CS")),
                columns: ColumnResolver::new(&header(), "Degree"),
            }
        }

        fn clean(&mut self, row: Vec<Cell>) -> bool {
            let mut access = InstitutionAccess {
                ids: &mut self.ids,
                store: &mut self.store,
            };
            self.cleaner.clean_row(&row, &self.columns, &mut access)
        }
    }

    #[test]
    fn test_clean_row_uses_doctoral_block() {
        let mut fx = Fixture::new();

        assert!(fx.clean(row("Kim", "F", "Stanford", "KAIST", "MIT")));

        let record = &fx.cleaner.records()[0];
        assert_eq!(record.gender, Gender::Female);
        // the doctoral institution is resolved before the current one
        assert_eq!(record.phd, InstId(1));
        assert_eq!(record.current, InstId(2));
        assert_eq!(fx.store.get_existing(InstId(1)).unwrap().info().name, "MIT");
        // the undergraduate institution is not part of the graph
        assert_eq!(fx.ids.len(), 2);
    }

    #[test]
    fn test_row_without_doctorate_is_dropped() {
        let mut fx = Fixture::new();

        assert!(!fx.clean(row("Lee", "M", "Stanford", "KAIST", "")));
        assert_eq!(fx.cleaner.dropped_rows(), 1);
        assert!(fx.cleaner.records().is_empty());
        assert!(fx.store.is_empty());
    }

    #[test]
    fn test_whitespace_variants_resolve_to_one_institution() {
        let mut fx = Fixture::new();
        fx.clean(row("Kim", "F", "Stanford", "KAIST", "MIT"));
        fx.clean(row("Park", "M", " Stanford  ", "KAIST", "MIT"));

        assert_eq!(fx.cleaner.vertex_count(), 2);
        assert_eq!(fx.cleaner.edges().get(&(InstId(1), InstId(2))), Some(&2));
    }

    #[test]
    fn test_statistics_over_small_field() {
        let mut fx = Fixture::new();
        // MIT places into Stanford and Berkeley, Stanford places into Berkeley
        fx.clean(row("A", "F", "Stanford", "KAIST", "MIT"));
        fx.clean(row("B", "M", "Berkeley", "KAIST", "MIT"));
        fx.clean(row("C", "F", "Berkeley", "KAIST", "Stanford"));

        let ranking = fx.cleaner.calc_mvr_rank().unwrap();
        let mit = fx.ids.get(&InstInfo::new("MIT", "", "USA").key_triple()).unwrap();
        assert_eq!(ranking.rank_of(mit), Some(1));
        assert_eq!(ranking.violations, 0);

        // MIT produced 2, Stanford 1, Berkeley 0
        let gini = fx.cleaner.calc_gini_coeff().unwrap();
        assert!((gini - 4.0 / 9.0).abs() < 1e-9);

        // Women: MIT(1) -> Stanford(2), Stanford(2) -> Berkeley(3)
        assert_eq!(fx.cleaner.calc_avg_mvr_move_based_on_gender(Gender::Female), Some(1.0));
        // Men: MIT(1) -> Berkeley(3)
        assert_eq!(fx.cleaner.calc_avg_mvr_move_based_on_gender(Gender::Male), Some(2.0));
        assert_eq!(fx.cleaner.calc_avg_mvr_move_based_on_gender(Gender::Unknown), None);

        // Only MIT sits in the top third
        assert_eq!(fx.cleaner.calc_avg_mvr_move_for_range(0, 33), Some(1.5));
        assert_eq!(fx.cleaner.calc_avg_mvr_move_for_range(50, 20), None);
    }

    #[test]
    fn test_empty_cleaner_has_no_distribution() {
        let mut cleaner = Cleaner::new(FieldKey::from("Empty"));
        assert!(matches!(cleaner.calc_gini_coeff(), Err(AnalysisError::EmptyDistribution(_))));
        assert!(cleaner.calc_mvr_rank().is_err());
        assert_eq!(cleaner.calc_avg_mvr_move_based_on_gender(Gender::Male), None);
    }
}
