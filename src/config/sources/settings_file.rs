//! Optional settings file source; format follows the file extension

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

/// Add a settings file to the builder. A missing file is an error only when
/// `required` is set.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
    required: bool,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !required && !path.is_file() {
        return Ok(builder);
    }
    Ok(builder.add_source(File::from(path).required(required)))
}
