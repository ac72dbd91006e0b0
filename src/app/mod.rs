pub mod aggregation;
pub mod analyzer;

pub use analyzer::{Analyzer, CleaningState, CleaningSummary, PreloadReport};
