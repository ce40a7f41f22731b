//! Logging System
//!
//! Structured logging built on `tracing`. Level, format and destination come
//! from [`LoggingConfig`] and can be overridden through `METACAT_LOG*`
//! environment variables.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

const ENV_FILTER: &str = "METACAT_LOG";
const ENV_FORMAT: &str = "METACAT_LOG_FORMAT";
const ENV_OUTPUT: &str = "METACAT_LOG_OUTPUT";
const ENV_FILE: &str = "METACAT_LOG_FILE";
const ENV_MODULES: &str = "METACAT_LOG_MODULES";

/// Resolve the log file path with precedence: METACAT_LOG_FILE env, config, default.
///
/// The default lives in the platform state directory.
pub fn resolve_log_file_path(config_file: Option<PathBuf>) -> Result<PathBuf, CatalogError> {
    if let Ok(env_path) = std::env::var(ENV_FILE) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf, CatalogError> {
    let project_dirs = directories::ProjectDirs::from("", "metacat", "metacat").ok_or_else(|| {
        CatalogError::ConfigError(
            "Could not determine platform state directory for log file".to_string(),
        )
    })?;
    let state_dir = project_dirs.state_dir().ok_or_else(|| {
        CatalogError::ConfigError("Platform state directory not available for log file".to_string())
    })?;
    Ok(state_dir.join("metacat.log"))
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means use runtime default
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, stdout/stderr only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "file".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

/// Output destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

/// Initialize the global subscriber
///
/// Priority order (highest to lowest):
/// 1. Environment variables (METACAT_LOG, METACAT_LOG_FORMAT, ...)
/// 2. Configuration
/// 3. Defaults
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), CatalogError> {
    if config.is_some_and(|c| !c.enabled) {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(|e| CatalogError::ConfigError(format!("Failed to install logger: {}", e)));
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;
    let use_color = config.map(|c| c.color).unwrap_or(true) && !output.file;
    let writer = build_writer(output, config.and_then(|c| c.file.clone()))?;

    let layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer)
            .boxed(),
        LogFormat::Text => fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(use_color)
            .with_writer(writer)
            .boxed(),
    };

    Registry::default()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| CatalogError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn build_writer(
    output: OutputDestinations,
    config_file: Option<PathBuf>,
) -> Result<BoxMakeWriter, CatalogError> {
    if !output.file {
        return Ok(match (output.stdout, output.stderr) {
            (true, true) => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
            (false, true) => BoxMakeWriter::new(std::io::stderr),
            _ => BoxMakeWriter::new(std::io::stdout),
        });
    }

    let log_file = resolve_log_file_path(config_file)?;
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            CatalogError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .map_err(|e| {
            CatalogError::ConfigError(format!("Failed to open log file {:?}: {}", log_file, e))
        })?;
    Ok(if output.stderr {
        BoxMakeWriter::new(file.and(std::io::stderr))
    } else {
        BoxMakeWriter::new(file)
    })
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, CatalogError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut directives: Vec<String> = config
        .map(|c| {
            c.modules
                .iter()
                .map(|(module, module_level)| format!("{}={}", module, module_level))
                .collect()
        })
        .unwrap_or_default();
    if let Ok(modules) = std::env::var(ENV_MODULES) {
        directives.extend(parse_module_directives(&modules));
    }

    let mut filter = EnvFilter::new(level);
    for directive in directives {
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| CatalogError::ConfigError(format!("Invalid log directive: {}", e)))?,
        );
    }
    Ok(filter)
}

/// `a=debug, b = trace` -> `["a=debug", "b=trace"]`; malformed entries are dropped
fn parse_module_directives(modules: &str) -> Vec<String> {
    modules.split(',')
        .filter_map(|entry| {
            let (module, level) = entry.split_once('=')?;
            let (module, level) = (module.trim(), level.trim());
            (!module.is_empty() && !level.is_empty()).then(|| format!("{}={}", module, level))
        })
        .collect()
}

fn parse_format(format: &str) -> Option<LogFormat> {
    match format {
        "json" => Some(LogFormat::Json),
        "text" => Some(LogFormat::Text),
        _ => None,
    }
}

/// Determine output format from environment or config
fn determine_format(config: Option<&LoggingConfig>) -> Result<LogFormat, CatalogError> {
    if let Some(format) = std::env::var(ENV_FORMAT).ok().and_then(|f| parse_format(&f)) {
        return Ok(format);
    }
    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    parse_format(format).ok_or_else(|| {
        CatalogError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        ))
    })
}

/// Determine output destinations from environment or config
fn determine_output(config: Option<&LoggingConfig>) -> Result<OutputDestinations, CatalogError> {
    if let Ok(output) = std::env::var(ENV_OUTPUT) {
        return parse_output_destinations(&output);
    }
    let output = config.map(|c| c.output.as_str()).unwrap_or("file");
    parse_output_destinations(output)
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations, CatalogError> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(CatalogError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations {
        stdout,
        stderr,
        file,
    })
}
