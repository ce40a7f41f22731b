//! Per-field merge decisions
//!
//! [`resolve_field`] is a pure function of the existing value, its recorded
//! sources, the incoming value and source, and a resolved policy.
//! [`merge_fields`] drives it over a whole attribute map and keeps the
//! provenance block in step.

use super::lists::list_merge;
use super::policy::{normalize, ResolvedPolicy, Rule};
use crate::config::CatalogConfig;
use crate::provenance::{MetadataSources, ProvenanceAction, SourceDescriptor};
use serde_json::{Map, Value};
use tracing::trace;

/// Outcome of resolving one field
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Existing value (or absence) stays as is
    Keep,
    Replace(Value),
    Merge(Value),
}

/// Values that never overwrite or create an attribute.
///
/// Numeric zero and `false` count as empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !*b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Decide the new value of a field.
pub fn resolve_field(
    existing: Option<&Value>,
    existing_sources: Option<&[String]>,
    incoming: &Value,
    incoming_source: &str,
    policy: &ResolvedPolicy,
) -> Resolution {
    let authorised = || policy.sources.iter().any(|s| s == incoming_source);
    match policy.rule {
        Rule::Single => {
            if policy.sources.first().map(String::as_str) == Some(incoming_source) {
                Resolution::Replace(incoming.clone())
            } else {
                Resolution::Keep
            }
        }
        Rule::Merge => match existing {
            _ if !authorised() => Resolution::Keep,
            None => Resolution::Replace(incoming.clone()),
            Some(current) => Resolution::Merge(list_merge(current, incoming, None)),
        },
        Rule::Priority => match existing {
            _ if !authorised() => Resolution::Keep,
            None => Resolution::Replace(incoming.clone()),
            Some(_) => {
                let rank = |name: &str| policy.sources.iter().position(|s| s == name);
                let existing_rank = existing_sources
                    .and_then(|sources| sources.first())
                    .and_then(|name| rank(name));
                match (existing_rank, rank(incoming_source)) {
                    (None, _) => Resolution::Replace(incoming.clone()),
                    (Some(current), Some(new)) if new < current => {
                        Resolution::Replace(incoming.clone())
                    }
                    _ => Resolution::Keep,
                }
            }
        },
        Rule::FirstComeFirstServed => match existing {
            None => Resolution::Replace(incoming.clone()),
            Some(_) => Resolution::Keep,
        },
    }
}

/// Counters for one attribute merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub replaced: usize,
    pub merged: usize,
    pub kept: usize,
    pub skipped_empty: usize,
}

/// Merge `incoming` into `attributes` field by field.
///
/// The source descriptor is added to `provenance.sources` and every write is
/// reflected in `provenance.key_source_map`.
pub fn merge_fields(
    attributes: &mut Map<String, Value>,
    provenance: &mut MetadataSources,
    incoming: &Map<String, Value>,
    source: &SourceDescriptor,
    source_name: &str,
    config: &CatalogConfig,
) -> MergeStats {
    let mut stats = MergeStats::default();
    provenance.add_source(source);

    for (field, value) in incoming {
        if is_empty_value(value) {
            stats.skipped_empty += 1;
            continue;
        }
        let policy = normalize(field, &config.dataset_policy(field), source_name);
        let resolution = resolve_field(
            attributes.get(field),
            provenance.sources_for(field),
            value,
            source_name,
            &policy,
        );
        trace!(field = field.as_str(), source = source_name, ?resolution, "Resolved field");
        match resolution {
            Resolution::Keep => stats.kept += 1,
            Resolution::Replace(new_value) => {
                attributes.insert(field.clone(), new_value);
                provenance.record(field, source_name, ProvenanceAction::Replace);
                stats.replaced += 1;
            }
            Resolution::Merge(new_value) => {
                attributes.insert(field.clone(), new_value);
                provenance.record(field, source_name, ProvenanceAction::Merge);
                stats.merged += 1;
            }
        }
    }
    stats
}
