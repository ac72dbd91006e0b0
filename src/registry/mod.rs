// Lazily populated registries owned by the analyzer

pub mod cleaner_registry;
pub mod id_registry;
pub mod institution_store;
pub mod lookup;

pub use cleaner_registry::CleanerRegistry;
pub use id_registry::InstIdRegistry;
pub use institution_store::InstitutionStore;
pub use lookup::{InstitutionAccess, InstitutionLookup, InstitutionSource};
