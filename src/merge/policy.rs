//! Field policy interpretation and normalisation.
//!
//! A raw policy comes straight from `property_sources.dataset.<field>` and may
//! be partial or malformed. [`normalize`] turns it into a [`ResolvedPolicy`]
//! for one incoming source; the rule dispatch in `engine` only ever sees the
//! resolved form.

use serde_json::Value;
use tracing::warn;

/// Rule as written in configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSpec {
    Single,
    Merge,
    Priority,
    /// No rule configured (absent, `null` or `"none"`)
    Unset,
    /// Any other value; falls back to first-come-first-served
    Unrecognized(String),
}

impl RuleSpec {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => RuleSpec::Unset,
            Some(Value::String(rule)) => match rule.as_str() {
                "single" => RuleSpec::Single,
                "merge" => RuleSpec::Merge,
                "priority" => RuleSpec::Priority,
                "none" => RuleSpec::Unset,
                other => RuleSpec::Unrecognized(other.to_string()),
            },
            Some(other) => RuleSpec::Unrecognized(other.to_string()),
        }
    }
}

/// Raw per-field policy: a rule plus the list of authorised source names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPolicy {
    pub rule: RuleSpec,
    /// Empty when the source is absent, empty, or not a string/list
    pub sources: Vec<String>,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self {
            rule: RuleSpec::Unset,
            sources: Vec::new(),
        }
    }
}

impl FieldPolicy {
    pub fn new(rule: RuleSpec, sources: &[&str]) -> Self {
        Self {
            rule,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Interpret a `{rule, source}` object leniently.
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let sources = match map.get("source") {
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            rule: RuleSpec::from_value(map.get("rule")),
            sources,
        }
    }
}

/// Rule after normalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Single,
    Merge,
    Priority,
    FirstComeFirstServed,
}

/// Fully normalised policy for one incoming source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    pub rule: Rule,
    pub sources: Vec<String>,
}

/// Normalise a raw policy against the incoming source name.
///
/// Steps, in order:
/// 1. No sources with a known or unset rule: `merge` authorises the incoming
///    source, every other rule authorises nobody.
/// 2. Sources with an unrecognised rule: the rule becomes unset.
/// 3. `["any"]` authorises exactly the incoming source.
pub fn normalize(field: &str, policy: &FieldPolicy, incoming_source: &str) -> ResolvedPolicy {
    let mut rule = policy.rule.clone();
    let mut sources = policy.sources.clone();

    // single/priority/unset keep the empty list
    if sources.is_empty() && rule == RuleSpec::Merge {
        sources = vec![incoming_source.to_string()];
    }

    if let RuleSpec::Unrecognized(raw) = &rule {
        warn!(
            field = field,
            rule = raw.as_str(),
            "Unrecognized merge rule, falling back to first-come-first-served"
        );
        if !sources.is_empty() {
            rule = RuleSpec::Unset;
        }
    }

    if sources.len() == 1 && sources[0] == "any" {
        sources = vec![incoming_source.to_string()];
    }

    let rule = match rule {
        RuleSpec::Single => Rule::Single,
        RuleSpec::Merge => Rule::Merge,
        RuleSpec::Priority => Rule::Priority,
        RuleSpec::Unset | RuleSpec::Unrecognized(_) => Rule::FirstComeFirstServed,
    };
    ResolvedPolicy { rule, sources }
}
