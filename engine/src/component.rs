//! Component definitions: observable field schema plus action table.
//!
//! A component is registered once and then serves many requests. Each request
//! gets a fresh view-model from the component's factory; the schema and the
//! action table are shared read-only.

use std::collections::HashSet;
use std::fmt;
use std::io::Write;

use anyhow::{Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::{Action, ActionTable};
use crate::core::types::{Snapshot, UpdateRequest};
use crate::error::UpdateError;
use crate::io::config::EngineConfig;
use crate::update::{RequestEnv, update};

/// Per-request component state.
pub trait ViewModel: Send + 'static {
    /// Release request-scoped resources. The engine calls this exactly once
    /// per update, whether the update succeeded or not.
    fn dispose(&mut self) {}
}

type Reader<M> = Box<dyn Fn(&M) -> serde_json::Result<Value> + Send + Sync>;
type Writer<M> = Box<dyn Fn(&mut M, &Value) -> serde_json::Result<()> + Send + Sync>;

/// One observable field with typed accessors.
pub struct Field<M> {
    name: &'static str,
    read: Reader<M>,
    write: Writer<M>,
}

impl<M: 'static> Field<M> {
    /// Declare a field through a shared and a mutable accessor to the same
    /// member of `M`.
    pub fn new<T, G, S>(name: &'static str, get: G, set: S) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
        G: Fn(&M) -> &T + Send + Sync + 'static,
        S: Fn(&mut M) -> &mut T + Send + Sync + 'static,
    {
        Self {
            name,
            read: Box::new(move |vm: &M| serde_json::to_value(get(vm))),
            write: Box::new(move |vm: &mut M, value: &Value| {
                *set(vm) = T::deserialize(value)?;
                Ok(())
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn read(&self, vm: &M) -> serde_json::Result<Value> {
        (self.read)(vm)
    }

    pub(crate) fn write(&self, vm: &mut M, value: &Value) -> serde_json::Result<()> {
        (self.write)(vm, value)
    }
}

/// Ordered set of observable fields.
pub struct Schema<M> {
    fields: Vec<Field<M>>,
}

impl<M: 'static> Schema<M> {
    pub fn fields(&self) -> &[Field<M>] {
        &self.fields
    }

    /// Reflect the declared fields of `vm`, in declaration order.
    pub fn snapshot(&self, vm: &M) -> Result<Snapshot, UpdateError> {
        let mut snapshot = Snapshot::new();
        for field in &self.fields {
            let value = field.read(vm).map_err(|source| UpdateError::Snapshot {
                field: field.name.to_string(),
                source,
            })?;
            snapshot.insert(field.name.to_string(), value);
        }
        Ok(snapshot)
    }
}

/// A registered component: factory, schema and action table.
pub struct Component<M> {
    name: String,
    factory: Box<dyn Fn() -> M + Send + Sync>,
    schema: Schema<M>,
    actions: ActionTable<M>,
}

impl<M: ViewModel> Component<M> {
    pub fn builder<F>(name: impl Into<String>, factory: F) -> ComponentBuilder<M>
    where
        F: Fn() -> M + Send + Sync + 'static,
    {
        ComponentBuilder {
            name: name.into(),
            factory: Box::new(factory),
            fields: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema<M> {
        &self.schema
    }

    pub fn actions(&self) -> &ActionTable<M> {
        &self.actions
    }

    /// Fresh, default-constructed view-model for one request.
    pub fn instantiate(&self) -> M {
        (self.factory)()
    }
}

impl<M: 'static> fmt::Debug for Component<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field(
                "fields",
                &self.schema.fields.iter().map(Field::name).collect::<Vec<_>>(),
            )
            .field("actions", &self.actions.names())
            .finish_non_exhaustive()
    }
}

pub struct ComponentBuilder<M> {
    name: String,
    factory: Box<dyn Fn() -> M + Send + Sync>,
    fields: Vec<Field<M>>,
    actions: Vec<Action<M>>,
}

impl<M: ViewModel> ComponentBuilder<M> {
    pub fn field<T, G, S>(mut self, name: &'static str, get: G, set: S) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
        G: Fn(&M) -> &T + Send + Sync + 'static,
        S: Fn(&mut M) -> &mut T + Send + Sync + 'static,
    {
        self.fields.push(Field::new(name, get, set));
        self
    }

    pub fn action(mut self, action: Action<M>) -> Self {
        self.actions.push(action);
        self
    }

    /// Finish registration. Field and action names must be unique.
    pub fn build(self) -> Result<Component<M>> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name) {
                bail!("component '{}': duplicate field '{}'", self.name, field.name);
            }
        }

        let mut actions = ActionTable::new();
        for action in self.actions {
            if let Err(err) = actions.insert(action) {
                bail!("component '{}': {err}", self.name);
            }
        }

        Ok(Component {
            name: self.name,
            factory: self.factory,
            schema: Schema {
                fields: self.fields,
            },
            actions,
        })
    }
}

/// Type-erased component, as stored in a host registry.
pub trait Endpoint: Send + Sync {
    fn name(&self) -> &str;

    fn action_names(&self) -> Vec<&str>;

    fn field_names(&self) -> Vec<&'static str>;

    /// Run one update against a fresh view-model, writing the envelope to `writer`.
    fn update(
        &self,
        request: &UpdateRequest,
        env: &RequestEnv<'_>,
        config: &EngineConfig,
        writer: &mut dyn Write,
    ) -> Result<(), UpdateError>;
}

impl<M: ViewModel> Endpoint for Component<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn action_names(&self) -> Vec<&str> {
        self.actions.names()
    }

    fn field_names(&self) -> Vec<&'static str> {
        self.schema.fields.iter().map(Field::name).collect()
    }

    fn update(
        &self,
        request: &UpdateRequest,
        env: &RequestEnv<'_>,
        config: &EngineConfig,
        writer: &mut dyn Write,
    ) -> Result<(), UpdateError> {
        update(self, self.instantiate(), request, env, config, writer)
    }
}
