mod error;
mod paths;

pub use error::{ConfigError, Result};
pub use paths::PathsConfig;

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 100 MiB: below this an extensionless file is treated as release junk.
pub const DEFAULT_MIN_UNLABELED_BYTES: u64 = 100 * 1024 * 1024;

fn default_min_unlabeled_bytes() -> u64 {
    DEFAULT_MIN_UNLABELED_BYTES
}

fn default_archive_extension() -> String {
    "rar".to_string()
}

fn default_extractor_program() -> String {
    "unrar".to_string()
}

fn default_extractor_args() -> Vec<String> {
    vec!["e".to_string(), "-o+".to_string()]
}

fn default_skip_names() -> Vec<String> {
    vec![".DS_Store".to_string(), "#recycle".to_string()]
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Extensionless files at least this large are moved as `<release>.mkv`
    #[serde(default = "default_min_unlabeled_bytes")]
    pub min_unlabeled_bytes: u64,
    /// Archive file suffix, without the dot
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_unlabeled_bytes: DEFAULT_MIN_UNLABELED_BYTES,
            archive_extension: default_archive_extension(),
        }
    }
}

/// External archive tool. It is invoked as `<program> <args..> <archive> <dest>`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor_program")]
    pub program: String,
    #[serde(default = "default_extractor_args")]
    pub args: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: default_extractor_program(),
            args: default_extractor_args(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    /// Top-level entries in the source roots that are never processed
    #[serde(default = "default_skip_names")]
    pub skip_names: Vec<String>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.paths.validate()?;

        if self.extractor.program.trim().is_empty() {
            return Err(ConfigError::EmptyExtractor);
        }

        if self.discovery.archive_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyArchiveExtension);
        }

        if self.discovery.min_unlabeled_bytes == 0 {
            return Err(ConfigError::ZeroThreshold);
        }

        Ok(())
    }
}
