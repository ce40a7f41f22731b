//! Runtime settings

use crate::logging::LoggingConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the catalog lives and which config it falls back to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog root; `metadata/` is created beneath it
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Config file used when the catalog root has no `config.json`
    #[serde(default)]
    pub default_config: Option<PathBuf>,
}

/// Top-level runtime settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Builder pre-seeded with the logging defaults
pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = LoggingConfig::default();
    Config::builder()
        .set_default("logging.enabled", defaults.enabled)?
        .set_default("logging.level", defaults.level)?
        .set_default("logging.format", defaults.format)?
        .set_default("logging.output", defaults.output)?
        .set_default("logging.color", defaults.color)
}
