//! Primitive conversion of untyped argument tokens.

use std::fmt;

use serde_json::{Number, Value};

/// Primitive shape an action parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
    /// Any JSON token, passed through unchanged.
    Any,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::Str => "string",
            ScalarKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// Convert `token` into the canonical JSON value of `kind`.
///
/// Returns a short reason when the conversion is impossible.
pub fn coerce_scalar(kind: ScalarKind, token: &Value) -> Result<Value, String> {
    match kind {
        ScalarKind::Any => Ok(token.clone()),
        ScalarKind::Bool => to_bool(token).map(Value::Bool),
        ScalarKind::Int => to_int(token).map(Value::from),
        ScalarKind::Float => to_float(token).and_then(float_value),
        ScalarKind::Str => to_str(token),
    }
}

fn to_bool(token: &Value) -> Result<bool, String> {
    match token {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!("'{s}' is not a boolean")),
        },
        other => Err(unsupported(other)),
    }
}

fn to_int(token: &Value) -> Result<i64, String> {
    match token {
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => number_to_int(n),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("'{s}' is not an integer")),
        other => Err(unsupported(other)),
    }
}

fn number_to_int(n: &Number) -> Result<i64, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(format!("{n} does not fit an integer")),
    }
}

fn to_float(token: &Value) -> Result<f64, String> {
    match token {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("{n} is not a number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{s}' is not a number")),
        other => Err(unsupported(other)),
    }
}

fn float_value(f: f64) -> Result<Value, String> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| format!("{f} is not a finite number"))
}

fn to_str(token: &Value) -> Result<Value, String> {
    match token {
        Value::Null => Ok(Value::Null),
        Value::String(_) => Ok(token.clone()),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        other => Err(unsupported(other)),
    }
}

fn unsupported(token: &Value) -> String {
    let kind = match token {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    format!("cannot convert {kind} token")
}
