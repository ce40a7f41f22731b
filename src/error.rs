//! Error types for the metadata catalog.

use crate::types::NodeIdentity;
use std::path::PathBuf;
use thiserror::Error;

/// Storage layer errors: node files, config files and the home pointer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File present but unreadable or unparsable
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    pub(crate) fn read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StorageError::Read {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StorageError::Write {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// A canonical record that cannot be mapped onto nodes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Metadata record is not a JSON object")]
    NotAnObject,

    #[error("Metadata record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Metadata record field '{field}' is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Metadata record has no source name in metadata_sources.sources[0]")]
    MissingSource,
}

/// Errors surfaced by the catalog façade.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A node this record contributed to failed to write at flush time
    #[error("Node {node} was not persisted: {message}")]
    NotPersisted { node: NodeIdentity, message: String },
}

impl From<config::ConfigError> for CatalogError {
    fn from(err: config::ConfigError) -> Self {
        CatalogError::ConfigError(err.to_string())
    }
}
