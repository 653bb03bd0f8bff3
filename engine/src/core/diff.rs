//! Top-level change detection between two view-model snapshots.

use serde_json::Value;

use crate::core::equality::deep_equal_opt;
use crate::core::types::Snapshot;

/// Compute the fields of `current` whose value differs from `original`.
///
/// Rules:
/// - Only keys present in `current` are considered, in `current`'s order.
/// - A field absent or `null` in `original` whose current value is an empty
///   array or object is skipped.
/// - Every other field is reported with its current value when the two values
///   are not deeply equal.
pub fn diff(original: &Snapshot, current: &Snapshot) -> Snapshot {
    let mut changes = Snapshot::new();

    for (key, value) in current {
        let orig = original.get(key);

        if orig.is_none_or(Value::is_null) && is_empty_structure(value) {
            continue;
        }

        if !deep_equal_opt(orig, Some(value)) {
            changes.insert(key.clone(), value.clone());
        }
    }

    changes
}

/// True for `[]` and `{}`.
fn is_empty_structure(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.is_empty(),
        _ => false,
    }
}
