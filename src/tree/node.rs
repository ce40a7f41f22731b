//! Catalog node and child references
//!
//! A [`Node`] is the persisted unit: identity, an open attribute map,
//! child references and provenance. Dataset nodes also carry the config they
//! were merged under, which is never part of the node file.

use crate::config::{CatalogConfig, ResolvedConfig};
use crate::merge::{merge_fields, MergeStats};
use crate::provenance::{MetadataSources, SourceDescriptor};
use crate::tree::hasher::{address_of, NodeAddress};
use crate::types::{NodeIdentity, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys every node file carries for identity
const IDENTITY_KEYS: [&str; 3] = ["type", "dataset_id", "dataset_version"];
const CHILDREN_KEY: &str = "children";
const SOURCES_KEY: &str = "metadata_sources";

/// Reference from a node to one of its children.
///
/// Serialized as `{"type", "name", ...extra}`; file children carry their full
/// metadata in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRef {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChildRef {
    pub fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Whether this reference and `other` point at the same child
    pub fn same_child(&self, other: &ChildRef) -> bool {
        self.kind == other.kind && self.name == other.name
    }
}

/// In-memory node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    identity: NodeIdentity,
    address: NodeAddress,
    pub attributes: Map<String, Value>,
    pub children: Vec<ChildRef>,
    pub metadata_sources: MetadataSources,
    /// Config binding; only ever set on dataset nodes
    pub config: Option<ResolvedConfig>,
}

impl Node {
    /// Fresh node with only its identity set
    pub fn new(identity: NodeIdentity) -> Self {
        let address = address_of(&identity);
        Self {
            identity,
            address,
            attributes: Map::new(),
            children: Vec::new(),
            metadata_sources: MetadataSources::new(),
            config: None,
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn kind(&self) -> NodeKind {
        self.identity.kind
    }

    pub fn address(&self) -> &NodeAddress {
        &self.address
    }

    /// Add a child unless one with the same kind and name exists.
    ///
    /// The first reference wins; returns whether the child was added.
    pub fn add_child(&mut self, child: ChildRef) -> bool {
        if self.children.iter().any(|c| c.same_child(&child)) {
            return false;
        }
        self.children.push(child);
        true
    }

    pub fn child(&self, kind: NodeKind, name: &str) -> Option<&ChildRef> {
        self.children
            .iter()
            .find(|c| c.kind == kind && c.name == name)
    }

    /// Merge record fields into the attributes under the node's bound config.
    ///
    /// Identity keys, `children` and `metadata_sources` are never treated as
    /// attributes. Nodes without a config binding merge first-come-first-served.
    pub fn merge_attributes(
        &mut self,
        incoming: &Map<String, Value>,
        source: &SourceDescriptor,
        source_name: &str,
    ) -> MergeStats {
        let mergeable: Map<String, Value> = incoming
            .iter()
            .filter(|(key, _)| !self.is_reserved_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        let default_config;
        let config = match &self.config {
            Some(resolved) => &resolved.config,
            None => {
                default_config = CatalogConfig::default();
                &default_config
            }
        };
        merge_fields(
            &mut self.attributes,
            &mut self.metadata_sources,
            &mergeable,
            source,
            source_name,
            config,
        )
    }

    fn is_reserved_key(&self, key: &str) -> bool {
        IDENTITY_KEYS.contains(&key)
            || key == CHILDREN_KEY
            || key == SOURCES_KEY
            || (self.identity.kind == NodeKind::Directory && (key == "path" || key == "name"))
    }

    /// Public JSON form written to the node file.
    ///
    /// Directory nodes also store their own `path` and `name`.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::String(self.identity.kind.to_string()));
        out.insert(
            "dataset_id".into(),
            Value::String(self.identity.dataset_id.clone()),
        );
        out.insert(
            "dataset_version".into(),
            Value::String(self.identity.dataset_version.clone()),
        );
        if self.identity.kind == NodeKind::Directory {
            if let Some(path) = &self.identity.path {
                out.insert("path".into(), Value::String(path.clone()));
            }
            if let Some(name) = self.identity.name() {
                out.insert("name".into(), Value::String(name.to_string()));
            }
        }
        for (key, value) in &self.attributes {
            out.insert(key.clone(), value.clone());
        }
        out.insert(
            CHILDREN_KEY.into(),
            serde_json::to_value(&self.children).unwrap_or_else(|_| Value::Array(Vec::new())),
        );
        out.insert(
            SOURCES_KEY.into(),
            serde_json::to_value(&self.metadata_sources).unwrap_or(Value::Null),
        );
        Value::Object(out)
    }

    /// Rebuild a node from its stored JSON form.
    ///
    /// The identity always comes from the caller; identity keys in the file
    /// are not re-interpreted.
    pub fn from_json(identity: NodeIdentity, value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut map) = value else {
            return Err(serde::de::Error::custom("node file is not a JSON object"));
        };
        let mut node = Node::new(identity);
        if let Some(children) = map.remove(CHILDREN_KEY) {
            node.children = serde_json::from_value(children)?;
        }
        if let Some(sources) = map.remove(SOURCES_KEY) {
            node.metadata_sources = serde_json::from_value(sources)?;
        }
        node.attributes = map
            .into_iter()
            .filter(|(key, _)| !node.is_reserved_key(key))
            .collect();
        Ok(node)
    }
}
