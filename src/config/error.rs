use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Path for '{name}' must be absolute: {}", path.display())]
    RelativePath { name: &'static str, path: PathBuf },

    #[error("Series and movie sources must differ: {}", path.display())]
    SharedSource { path: PathBuf },

    #[error("Extractor program must not be empty")]
    EmptyExtractor,

    #[error("Archive extension must not be empty")]
    EmptyArchiveExtension,

    #[error("min_unlabeled_bytes must be greater than zero")]
    ZeroThreshold,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
