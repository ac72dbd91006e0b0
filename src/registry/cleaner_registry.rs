use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::info;

use crate::domain::FieldKey;
use crate::pipeline::cleaner::Cleaner;

/// One cleaner per field, kept in first-reference order
#[derive(Debug, Default)]
pub struct CleanerRegistry {
    cleaners: IndexMap<FieldKey, Cleaner>,
}

impl CleanerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cleaner for `field`, creating it on first reference.
    /// Missing or empty fields never get a cleaner.
    pub fn get_or_create(&mut self, field: Option<&FieldKey>) -> Option<&mut Cleaner> {
        let field = match field {
            Some(field) if !field.is_empty() => field,
            _ => {
                info!("Attempt to generate Cleaner with empty value is suppressed");
                return None;
            }
        };

        match self.cleaners.entry(field.clone()) {
            Entry::Occupied(entry) => Some(entry.into_mut()),
            Entry::Vacant(entry) => {
                info!("Got New Cleaner for {}", field);
                Some(entry.insert(Cleaner::new(field.clone())))
            }
        }
    }

    pub fn has(&self, field: &FieldKey) -> bool {
        self.cleaners.contains_key(field)
    }

    pub fn get(&self, field: &FieldKey) -> Option<&Cleaner> {
        self.cleaners.get(field)
    }

    pub fn get_mut(&mut self, field: &FieldKey) -> Option<&mut Cleaner> {
        self.cleaners.get_mut(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Cleaner)> {
        self.cleaners.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&FieldKey, &mut Cleaner)> {
        self.cleaners.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.cleaners.keys()
    }

    pub fn len(&self) -> usize {
        self.cleaners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cleaners.is_empty()
    }
}
