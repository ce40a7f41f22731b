//! Configuration
//!
//! Two separate concerns live here:
//! - [`CatalogConfig`]: the catalog/dataset-level document that carries the
//!   per-field merge policies (`property_sources`)
//! - [`Settings`]: runtime settings (catalog root, default config, logging),
//!   layered with the `config` crate

pub mod facade;
pub mod settings;
pub mod sources;

pub use facade::SettingsLoader;
pub use settings::{CatalogSettings, Settings};

use crate::error::StorageError;
use crate::merge::FieldPolicy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Catalog name used by the built-in default config
pub const DEFAULT_CATALOG_NAME: &str = "DataCat";

/// Merge policies, scoped by node kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySources {
    /// Field name -> `{rule, source}` for dataset nodes
    #[serde(default)]
    pub dataset: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Catalog- or dataset-level configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    #[serde(default)]
    pub property_sources: PropertySources,
    /// Keys this crate does not interpret, kept for round-tripping
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            catalog_name: Some(DEFAULT_CATALOG_NAME.to_string()),
            logo_path: None,
            property_sources: PropertySources::default(),
            extra: Map::new(),
        }
    }
}

impl CatalogConfig {
    /// Load a config file, choosing the parser from the extension.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let content = std::fs::read_to_string(path).map_err(|e| StorageError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let parsed = match extension.as_deref() {
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Some("yml") | Some("yaml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            other => Err(format!(
                "unsupported config file extension {:?} (expected json, yml or yaml)",
                other.unwrap_or("")
            )),
        };
        parsed.map_err(|message| StorageError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Raw policy configured for a dataset field
    pub fn dataset_policy(&self, field: &str) -> FieldPolicy {
        FieldPolicy::from_value(self.property_sources.dataset.get(field))
    }
}

/// Where a dataset's resolved config came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Persisted `config.json` of the dataset version, or an explicitly supplied file
    Dataset,
    /// The catalog's default
    Catalog,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Dataset => f.write_str("dataset"),
            ConfigSource::Catalog => f.write_str("catalog"),
        }
    }
}

/// A config together with its source tag
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: CatalogConfig,
    pub source: ConfigSource,
}
