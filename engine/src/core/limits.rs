//! Structural limits applied to untrusted client payloads.

use serde_json::Value;

/// True if `value` nests arrays/objects more than `max_depth` levels deep.
///
/// Primitives have depth 0; `[]` and `{}` have depth 1. The walk stops as
/// soon as the limit is exceeded.
pub fn exceeds_depth(value: &Value, max_depth: usize) -> bool {
    fn walk(value: &Value, remaining: usize) -> bool {
        match value {
            Value::Array(items) => {
                remaining == 0 || items.iter().any(|item| walk(item, remaining - 1))
            }
            Value::Object(members) => {
                remaining == 0 || members.values().any(|member| walk(member, remaining - 1))
            }
            _ => false,
        }
    }
    walk(value, max_depth)
}
