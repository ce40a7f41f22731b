//! SettingsLoader facade over the layered sources.

use super::settings::{builder_with_defaults, Settings};
use super::sources::{environment, settings_file};
use config::ConfigError;
use std::path::Path;

/// Settings loader facade.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from defaults and environment only.
    pub fn load() -> Result<Settings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Load settings from a specific file with environment overlay.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load_from_file(path: &Path) -> Result<Settings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = settings_file::add_to_builder(builder, path, true)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Like [`load_from_file`](Self::load_from_file), but a missing file is skipped.
    pub fn load_optional(path: &Path) -> Result<Settings, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = settings_file::add_to_builder(builder, path, false)?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}
