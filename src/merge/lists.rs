//! Order-preserving list union used by the `merge` rule.

use serde_json::Value;

/// Wrap a scalar or object into a one-element list; lists pass through
pub fn as_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Whether two items count as duplicates.
///
/// Objects compare on `keys` when given (every key present in both and equal),
/// otherwise on full equality. Non-objects always compare on full equality.
fn is_duplicate(existing: &Value, incoming: &Value, keys: Option<&[&str]>) -> bool {
    match (existing, incoming, keys) {
        (Value::Object(a), Value::Object(b), Some(keys)) => keys
            .iter()
            .all(|k| matches!((a.get(*k), b.get(*k)), (Some(x), Some(y)) if x == y)),
        _ => existing == incoming,
    }
}

/// Union of two values as lists.
///
/// Items keep the position of their first occurrence; later duplicates
/// (within either side) are dropped.
pub fn list_merge(existing: &Value, incoming: &Value, keys: Option<&[&str]>) -> Value {
    let mut merged: Vec<Value> = Vec::new();
    for item in as_list(existing).into_iter().chain(as_list(incoming)) {
        if !merged.iter().any(|m| is_duplicate(m, &item, keys)) {
            merged.push(item);
        }
    }
    Value::Array(merged)
}
