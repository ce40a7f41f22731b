//! Metadata provenance
//!
//! Tracks which sources contributed to a node (`sources`) and which source(s)
//! produced the current value of each field (`key_source_map`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// How a field write affected provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvenanceAction {
    /// The field now holds only the incoming source's value
    Replace,
    /// The incoming value was unioned into the existing one
    Merge,
}

/// One source descriptor as carried by incoming records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_parameter: Option<Value>,
    /// Any additional keys are kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceDescriptor {
    pub fn named(name: &str) -> Self {
        Self {
            source_name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Sources are identified by name and version only
    fn same_source(&self, other: &SourceDescriptor) -> bool {
        self.source_name == other.source_name && self.source_version == other.source_version
    }
}

/// The `metadata_sources` block of a node or record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSources {
    #[serde(default)]
    pub key_source_map: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub sources: Vec<SourceDescriptor>,
}

impl MetadataSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source descriptor unless one with the same name and version exists
    pub fn add_source(&mut self, descriptor: &SourceDescriptor) {
        if !self.sources.iter().any(|s| s.same_source(descriptor)) {
            self.sources.push(descriptor.clone());
        }
    }

    /// Record that `source_name` wrote `field`
    pub fn record(&mut self, field: &str, source_name: &str, action: ProvenanceAction) {
        let entry = self.key_source_map.entry(field.to_string()).or_default();
        match action {
            ProvenanceAction::Replace => {
                entry.clear();
                entry.push(source_name.to_string());
            }
            ProvenanceAction::Merge => {
                if !entry.iter().any(|s| s == source_name) {
                    entry.push(source_name.to_string());
                }
            }
        }
    }

    /// Sources recorded for a field, if any
    pub fn sources_for(&self, field: &str) -> Option<&[String]> {
        self.key_source_map
            .get(field)
            .filter(|sources| !sources.is_empty())
            .map(Vec::as_slice)
    }
}
