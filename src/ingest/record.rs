//! Canonical record parsing
//!
//! Records arrive as already-validated JSON objects. Parsing only pulls out
//! what decomposition needs and keeps the full object for merging.

use crate::error::RecordError;
use crate::provenance::SourceDescriptor;
use crate::types::path_segments;
use serde_json::{Map, Value};

pub const SUBDATASETS_KEY: &str = "subdatasets";

/// Record level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Dataset,
    File,
}

/// Subdataset reference carried by a dataset record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdatasetRef {
    pub dataset_id: String,
    pub dataset_version: String,
    /// Normalised segments of the path relative to the parent dataset
    pub segments: Vec<String>,
}

/// One incoming metadata record
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub kind: RecordKind,
    pub dataset_id: String,
    pub dataset_version: String,
    /// Normalised file path segments; empty for dataset records
    pub path_segments: Vec<String>,
    pub subdatasets: Vec<SubdatasetRef>,
    /// `metadata_sources.sources[0]`
    pub source: SourceDescriptor,
    pub source_name: String,
    /// The whole record object
    pub fields: Map<String, Value>,
}

fn required_str<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, RecordError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(RecordError::MissingField(field)),
        Some(Value::String(s)) if s.is_empty() => Err(RecordError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(RecordError::InvalidField {
            field,
            reason: format!("expected a string, found {}", other),
        }),
    }
}

/// Dataset ids and versions become directory names
fn identity_component(
    map: &Map<String, Value>,
    field: &'static str,
) -> Result<String, RecordError> {
    let value = required_str(map, field)?;
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(RecordError::InvalidField {
            field,
            reason: format!("'{}' cannot be used as a directory name", value),
        });
    }
    Ok(value.to_string())
}

fn segments_of(path: &str, field: &'static str) -> Result<Vec<String>, RecordError> {
    let segments = path_segments(path);
    if segments.is_empty() {
        return Err(RecordError::InvalidField {
            field,
            reason: format!("path '{}' has no segments", path),
        });
    }
    if segments.iter().any(|segment| segment == "..") {
        return Err(RecordError::InvalidField {
            field,
            reason: format!("path '{}' leaves the dataset root", path),
        });
    }
    Ok(segments)
}

fn primary_source(map: &Map<String, Value>) -> Result<(SourceDescriptor, String), RecordError> {
    let first = map
        .get("metadata_sources")
        .and_then(|s| s.get("sources"))
        .and_then(|s| s.get(0))
        .ok_or(RecordError::MissingSource)?;
    let descriptor: SourceDescriptor =
        serde_json::from_value(first.clone()).map_err(|e| RecordError::InvalidField {
            field: "metadata_sources",
            reason: e.to_string(),
        })?;
    let name = descriptor
        .source_name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or(RecordError::MissingSource)?;
    Ok((descriptor, name))
}

fn parse_subdatasets(map: &Map<String, Value>) -> Result<Vec<SubdatasetRef>, RecordError> {
    let items = match map.get(SUBDATASETS_KEY) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(RecordError::InvalidField {
                field: SUBDATASETS_KEY,
                reason: "expected a list".to_string(),
            })
        }
    };
    items
        .iter()
        .map(|item| {
            let entry = item.as_object().ok_or_else(|| RecordError::InvalidField {
                field: SUBDATASETS_KEY,
                reason: "entries must be objects".to_string(),
            })?;
            let path = required_str(entry, "dataset_path")?;
            Ok(SubdatasetRef {
                dataset_id: required_str(entry, "dataset_id")?.to_string(),
                dataset_version: required_str(entry, "dataset_version")?.to_string(),
                segments: segments_of(path, SUBDATASETS_KEY)?,
            })
        })
        .collect()
}

impl CanonicalRecord {
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let map = value.as_object().ok_or(RecordError::NotAnObject)?;
        let kind = match required_str(map, "type")? {
            "dataset" => RecordKind::Dataset,
            "file" => RecordKind::File,
            other => {
                return Err(RecordError::InvalidField {
                    field: "type",
                    reason: format!("unsupported record type '{}'", other),
                })
            }
        };
        let dataset_id = identity_component(map, "dataset_id")?;
        let dataset_version = identity_component(map, "dataset_version")?;
        let (path_segments, subdatasets) = match kind {
            RecordKind::File => (segments_of(required_str(map, "path")?, "path")?, Vec::new()),
            RecordKind::Dataset => (Vec::new(), parse_subdatasets(map)?),
        };
        let (source, source_name) = primary_source(map)?;
        Ok(Self {
            kind,
            dataset_id,
            dataset_version,
            path_segments,
            subdatasets,
            source,
            source_name,
            fields: map.clone(),
        })
    }

    /// Fields to merge into the dataset node
    pub fn dataset_attributes(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(key, _)| key.as_str() != SUBDATASETS_KEY)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
