//! Shared deterministic types for the update pipeline.
//!
//! These types define stable contracts between engine stages and the host.
//! They carry no behavior beyond (de)serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name → value mapping of a view-model's observable state.
///
/// Insertion order is the order fields were declared on the component, so
/// serialized snapshots and diffs are stable across runs.
pub type Snapshot = Map<String, Value>;

/// One client update call, as submitted by the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    /// Durable `$data` fields of the component.
    #[serde(default)]
    pub data: Value,
    /// Externally passed `$props` fields. Applied after `data`.
    #[serde(default)]
    pub props: Value,
    /// Name of the action to invoke.
    pub method: String,
    /// Positional argument tokens for the action.
    #[serde(default)]
    pub params: Vec<Value>,
}

impl UpdateRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            props: Value::Null,
            method: method.into(),
            params: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}
