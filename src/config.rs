use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::common::constants::{DEGREE_ANCHOR_COLUMN, DEPARTMENT_COLUMN};
use crate::common::error::{AnalysisError, Result};
use crate::infra::FileExt;

pub const DEFAULT_CONFIG_PATH: &str = "analyzer.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Directory of raw survey sheets to clean
    pub source_dir: PathBuf,
    /// Directory that receives vertex/edge exports
    pub export_dir: PathBuf,
    /// Optional institution ID dictionary loaded before cleaning
    pub inst_id_dict: Option<PathBuf>,
    pub accepted_extensions: Vec<FileExt>,
    pub department_column: String,
    pub anchor_column: String,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("../dataset/dirty"),
            export_dir: PathBuf::from("../dataset/export"),
            inst_id_dict: None,
            accepted_extensions: vec![FileExt::Xlsx],
            department_column: DEPARTMENT_COLUMN.to_string(),
            anchor_column: DEGREE_ANCHOR_COLUMN.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "analyzer.log".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MOBILITY_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("MOBILITY_SOURCE_DIR") {
            self.source_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("MOBILITY_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("MOBILITY_INST_ID_DICT") {
            self.inst_id_dict = Some(PathBuf::from(path));
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.accepted_extensions.is_empty() {
            return Err(AnalysisError::Config(
                "accepted_extensions must list at least one format".to_string(),
            ));
        }
        if self.department_column.trim().is_empty() || self.anchor_column.trim().is_empty() {
            return Err(AnalysisError::Config(
                "department_column and anchor_column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyzerConfig::from_toml(
            r#"
            source_dir = "data/raw"
            accepted_extensions = ["xlsx", "csv"]

            [logging]
            dir = "var/log"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_dir, PathBuf::from("data/raw"));
        assert_eq!(config.accepted_extensions, vec![FileExt::Xlsx, FileExt::Csv]);
        assert_eq!(config.department_column, "Department");
        assert_eq!(config.logging.dir, PathBuf::from("var/log"));
        assert_eq!(config.logging.file_name, "analyzer.log");
    }

    #[test]
    fn test_empty_extension_list_is_rejected() {
        let result = AnalyzerConfig::from_toml("accepted_extensions = []");
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_unknown_extension_is_a_parse_error() {
        let result = AnalyzerConfig::from_toml(r#"accepted_extensions = ["txt"]"#);
        assert!(matches!(result, Err(AnalysisError::Toml(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = AnalyzerConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("../dataset/dirty"));
        assert_eq!(config.accepted_extensions, vec![FileExt::Xlsx]);
    }
}
