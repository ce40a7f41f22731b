//! Integration tests for the metadata catalog

mod config_resolution;
mod decomposition;
mod removal;
mod replay;
mod storage_errors;
mod support;
