use std::collections::HashMap;
use tracing::{debug, info};

use crate::domain::{InstId, KeyTriple};

/// Maps institution key triples to stable integer IDs.
///
/// IDs start at 1 and follow first-seen order. A mapping is never replaced
/// or removed, so `len() + 1` is always the next free ID.
#[derive(Debug, Default)]
pub struct InstIdRegistry {
    ids: HashMap<KeyTriple, InstId>,
}

impl InstIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ID for `key`, allocating a new one on first sight
    pub fn resolve(&mut self, key: &KeyTriple) -> InstId {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }

        let id = self.next_id();
        self.ids.insert(key.clone(), id);
        info!("New Inst ID Allocated: {} -> {}", key, id);
        id
    }

    /// Bulk-initialization variant of `resolve`: refuses keys already present
    pub fn preload(&mut self, key: KeyTriple) -> bool {
        if self.ids.contains_key(&key) {
            debug!("Duplicate key in ID dictionary: {}", key);
            return false;
        }

        let id = self.next_id();
        self.ids.insert(key, id);
        true
    }

    pub fn get(&self, key: &KeyTriple) -> Option<InstId> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All mappings ordered by ID
    pub fn entries(&self) -> Vec<(&KeyTriple, InstId)> {
        let mut entries: Vec<_> = self.ids.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_by_key(|(_, id)| *id);
        entries
    }

    fn next_id(&self) -> InstId {
        InstId(self.ids.len() as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mit() -> KeyTriple {
        KeyTriple::new("MIT", "", "USA")
    }

    #[test]
    fn test_resolve_allocates_in_first_seen_order() {
        let mut registry = InstIdRegistry::new();

        assert_eq!(registry.resolve(&mit()), InstId(1));
        assert_eq!(registry.resolve(&mit()), InstId(1));
        assert_eq!(registry.resolve(&KeyTriple::new("Stanford", "", "USA")), InstId(2));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_distinct_keys_get_distinct_ids() {
        let mut registry = InstIdRegistry::new();
        let a = registry.resolve(&KeyTriple::new("A", "B", "KR"));
        let b = registry.resolve(&KeyTriple::new("B", "A", "KR"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_preload_refuses_existing_key() {
        let mut registry = InstIdRegistry::new();

        assert!(registry.preload(mit()));
        assert!(!registry.preload(mit()));
        assert_eq!(registry.get(&mit()), Some(InstId(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_continues_after_preload() {
        let mut registry = InstIdRegistry::new();
        registry.preload(mit());
        registry.preload(KeyTriple::new("KAIST", "", "KR"));

        assert_eq!(registry.resolve(&mit()), InstId(1));
        assert_eq!(registry.resolve(&KeyTriple::new("SNU", "", "KR")), InstId(3));

        let ids: Vec<InstId> = registry.entries().into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![InstId(1), InstId(2), InstId(3)]);
    }
}
