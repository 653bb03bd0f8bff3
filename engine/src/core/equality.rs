//! Deep structural equality over JSON values.

use serde_json::{Map, Number, Value};

/// Compare two optional values structurally.
///
/// `None` (absent) and `Some(Value::Null)` are equal to each other, so a
/// missing field and an explicit `null` never count as a change.
pub fn deep_equal_opt(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (Some(a), Some(b)) => deep_equal(a, b),
        _ => false,
    }
}

/// Performs a deep equality check between two JSON values.
///
/// - Primitives compare by value; numbers compare across integer and float
///   representations (`1 == 1.0`).
/// - Arrays compare element-by-element, in order.
/// - Objects compare member-by-member, where a missing member equals `null`.
/// - Values of different kinds are never equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            arr_a.len() == arr_b.len()
                && arr_a
                    .iter()
                    .zip(arr_b)
                    .all(|(item_a, item_b)| deep_equal(item_a, item_b))
        }
        (Value::Object(obj_a), Value::Object(obj_b)) => objects_equal(obj_a, obj_b),
        _ => false,
    }
}

fn objects_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    let left = a
        .iter()
        .all(|(key, value)| deep_equal_opt(Some(value), b.get(key)));
    let right = b
        .iter()
        .filter(|(key, _)| !a.contains_key(key.as_str()))
        .all(|(_, value)| value.is_null());
    left && right
}

/// Numeric equality with integer/float cross-type coercion.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    // A negative integer against one above i64::MAX.
    false
}
