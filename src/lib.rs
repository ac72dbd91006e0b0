//! Academic mobility analysis over faculty survey sheets.
//!
//! Raw sheets are cleaned into per-field placement graphs (doctoral
//! institution -> current institution) and summarized as Gini coefficients,
//! minimum violation rankings and average rank moves.

pub mod app;
pub mod common;
pub mod config;
pub mod domain;
pub mod infra;
pub mod observability;
pub mod pipeline;
pub mod registry;

pub use app::{Analyzer, CleaningState, CleaningSummary, PreloadReport};
pub use common::{AnalysisError, Result};
pub use config::AnalyzerConfig;
pub use domain::{FieldKey, Gender, InstId, InstInfo, Institution, KeyTriple};
pub use infra::FileExt;
