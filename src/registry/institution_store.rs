use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::common::error::{AnalysisError, Result};
use crate::domain::{FieldKey, InstId, InstInfo, Institution};

/// Institution records keyed by ID, created on first reference
#[derive(Debug, Default)]
pub struct InstitutionStore {
    institutions: BTreeMap<InstId, Institution>,
}

impl InstitutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the record for `id`, creating it from `info` if unseen, and
    /// register `field` as one of its fields
    pub fn get_or_create(&mut self, id: InstId, info: &InstInfo, field: &FieldKey) -> &Institution {
        let institution = self.institutions.entry(id).or_insert_with(|| {
            let mut info = info.clone();
            info.inst_id = Some(id);
            info!("Got New Institution: [{}] {}", id, info.name);
            Institution::new(info)
        });

        institution.get_field(field);
        institution
    }

    pub fn get_existing(&self, id: InstId) -> Result<&Institution> {
        self.institutions.get(&id).ok_or_else(|| {
            warn!("Invalid Institution ID: {}", id);
            AnalysisError::NotFoundInstitution(id)
        })
    }

    pub fn contains(&self, id: InstId) -> bool {
        self.institutions.contains_key(&id)
    }

    /// Every institution, ascending by ID
    pub fn list_all(&self) -> impl Iterator<Item = &Institution> {
        self.institutions.values()
    }

    pub fn print_all(&self) {
        for institution in self.list_all() {
            institution.print_info();
        }
    }

    pub fn len(&self) -> usize {
        self.institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.institutions.is_empty()
    }
}
