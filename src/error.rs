//! カタログのエラー型

use std::path::PathBuf;
use thiserror::Error;

/// スキルカタログ操作のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read skill file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid frontmatter in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid frontmatter in {path}: {reason}")]
    InvalidFrontmatter { path: PathBuf, reason: String },

    #[error("Skill in {path} has no name")]
    MissingName { path: PathBuf },

    #[error("Duplicate skill name '{name}': {first} and {second}")]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Skill not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
