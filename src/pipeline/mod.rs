// Row-level processing: column resolution and the per-field cleaners

pub mod cleaner;
pub mod columns;

pub use cleaner::{AlumniRecord, Cleaner, ExportedFiles, MvrRanking};
pub use columns::{ColumnResolver, MatchMode};
