//! Settings sources, lowest precedence first: settings file, environment

pub mod environment;
pub mod settings_file;
