//! Core types for the metadata catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Digest: lowercase hex MD5 of a node's long name
pub type Digest = String;

/// Kind of entity a node (or child reference) describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Dataset,
    Directory,
    File,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Dataset => "dataset",
            NodeKind::Directory => "directory",
            NodeKind::File => "file",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dataset" => Some(NodeKind::Dataset),
            "directory" => Some(NodeKind::Directory),
            "file" => Some(NodeKind::File),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity tuple of a persisted node. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    pub dataset_id: String,
    pub dataset_version: String,
    pub kind: NodeKind,
    /// Relative path inside the dataset; `None` for dataset nodes
    pub path: Option<String>,
}

impl NodeIdentity {
    pub fn dataset(dataset_id: &str, dataset_version: &str) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            dataset_version: dataset_version.to_string(),
            kind: NodeKind::Dataset,
            path: None,
        }
    }

    pub fn directory(dataset_id: &str, dataset_version: &str, path: &str) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            dataset_version: dataset_version.to_string(),
            kind: NodeKind::Directory,
            path: Some(path.to_string()),
        }
    }

    /// Last path segment, used as the `name` of directory nodes
    pub fn name(&self) -> Option<&str> {
        self.path
            .as_deref()
            .map(|p| p.rsplit('/').next().unwrap_or(p))
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "{} {}@{}:{}",
                self.kind, self.dataset_id, self.dataset_version, path
            ),
            None => write!(f, "{} {}@{}", self.kind, self.dataset_id, self.dataset_version),
        }
    }
}

/// Split a relative path into its segments.
///
/// Leading, trailing and repeated separators are ignored, as are `.` segments.
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(str::to_string)
        .collect()
}

/// Prefixes of a segment list joined with `/`: `[a, b, c]` -> `[a, a/b, a/b/c]`
pub fn incremental_paths(segments: &[String]) -> Vec<String> {
    let mut paths = Vec::with_capacity(segments.len());
    let mut current = String::new();
    for segment in segments {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        paths.push(current.clone());
    }
    paths
}
