use crate::common::error::Result;
use crate::domain::{FieldKey, InstId, InstInfo, Institution};

use super::{InstIdRegistry, InstitutionStore};

/// Read-only access to institution records
pub trait InstitutionSource {
    fn get_existing_institution(&self, id: InstId) -> Result<&Institution>;
}

/// The capability a cleaner needs to register the institutions it sees.
///
/// Cleaners receive this per call; they never own the registries.
pub trait InstitutionLookup: InstitutionSource {
    /// Resolve the stable ID for `info`'s key triple
    fn inst_id_for(&mut self, info: &InstInfo) -> InstId;

    /// Resolve `info` (filling in `inst_id`) and register it under `field`
    fn get_institution(&mut self, info: &mut InstInfo, field: &FieldKey) -> &Institution;
}

impl InstitutionSource for InstitutionStore {
    fn get_existing_institution(&self, id: InstId) -> Result<&Institution> {
        self.get_existing(id)
    }
}

/// Borrowed view over the analyzer's identity registry and store
pub struct InstitutionAccess<'a> {
    pub ids: &'a mut InstIdRegistry,
    pub store: &'a mut InstitutionStore,
}

impl InstitutionSource for InstitutionAccess<'_> {
    fn get_existing_institution(&self, id: InstId) -> Result<&Institution> {
        self.store.get_existing(id)
    }
}

impl InstitutionLookup for InstitutionAccess<'_> {
    fn inst_id_for(&mut self, info: &InstInfo) -> InstId {
        self.ids.resolve(&info.key_triple())
    }

    fn get_institution(&mut self, info: &mut InstInfo, field: &FieldKey) -> &Institution {
        let id = match info.inst_id {
            Some(id) => id,
            None => {
                let id = self.inst_id_for(info);
                info.inst_id = Some(id);
                id
            }
        };
        self.store.get_or_create(id, info, field)
    }
}
