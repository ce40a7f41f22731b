//! Environment variable source: METACAT_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix shared by every settings variable
pub const ENV_PREFIX: &str = "METACAT";

/// Add environment variable overlay to builder.
/// `METACAT__CATALOG__ROOT` maps to `catalog.root`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
