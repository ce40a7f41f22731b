//! Attribute merge engine
//!
//! Three layers, each usable on its own:
//! - `policy`: turns a raw `{rule, source}` config entry into a resolved policy
//! - `engine`: per-field rule dispatch and whole-map merging
//! - `lists`: the order-preserving union behind the `merge` rule

pub mod engine;
pub mod lists;
pub mod policy;

pub use engine::{is_empty_value, merge_fields, resolve_field, MergeStats, Resolution};
pub use lists::list_merge;
pub use policy::{normalize, FieldPolicy, ResolvedPolicy, Rule, RuleSpec};
