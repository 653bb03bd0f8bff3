//! Server actions a component exposes to its client.
//!
//! An [`Action`] couples a handler with the metadata the invoker needs before
//! running it: declared parameter shapes and the authorization policy. The
//! [`ActionTable`] is built once at registration and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::coerce::ScalarKind;
use crate::core::types::Snapshot;
use crate::io::identity::Caller;
use crate::io::uploads::UploadedFile;

type Handler<M> =
    Box<dyn Fn(&mut M, &mut ActionContext<'_>, Arguments) -> Result<Value> + Send + Sync>;

type Check = fn(&Value) -> serde_json::Result<()>;

/// Declared shape of one action parameter. Binding dispatches on this tag.
#[derive(Clone, Copy)]
pub enum Param {
    /// A single upload, named by the token's string value.
    File,
    /// Every upload under the field named by the token.
    FileList,
    /// A structured value that must deserialize into the named type.
    Object { type_name: &'static str, check: Check },
    /// A string token naming a member of the named enum.
    Enum { type_name: &'static str, check: Check },
    Scalar(ScalarKind),
}

impl Param {
    pub const BOOL: Param = Param::Scalar(ScalarKind::Bool);
    pub const INT: Param = Param::Scalar(ScalarKind::Int);
    pub const FLOAT: Param = Param::Scalar(ScalarKind::Float);
    pub const STR: Param = Param::Scalar(ScalarKind::Str);
    pub const ANY: Param = Param::Scalar(ScalarKind::Any);

    pub fn object<T: DeserializeOwned>() -> Self {
        Param::Object {
            type_name: std::any::type_name::<T>(),
            check: accepts::<T>,
        }
    }

    /// Enum parameter; `T` is deserialized from the member name (serde unit variants).
    pub fn enumeration<T: DeserializeOwned>() -> Self {
        Param::Enum {
            type_name: std::any::type_name::<T>(),
            check: accepts::<T>,
        }
    }
}

fn accepts<T: DeserializeOwned>(value: &Value) -> serde_json::Result<()> {
    T::deserialize(value).map(drop)
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::File => f.write_str("file"),
            Param::FileList => f.write_str("file list"),
            Param::Object { type_name, .. } => write!(f, "object {type_name}"),
            Param::Enum { type_name, .. } => write!(f, "enum {type_name}"),
            Param::Scalar(kind) => write!(f, "{kind}"),
        }
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({self})")
    }
}

/// Descriptor of one exposed server action.
pub struct Action<M> {
    name: String,
    params: Vec<Param>,
    authenticated: bool,
    roles: Vec<String>,
    handler: Handler<M>,
}

impl<M> Action<M> {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut M, &mut ActionContext<'_>, Arguments) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            params: Vec::new(),
            authenticated: false,
            roles: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Reject unauthenticated callers.
    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// Accept only callers holding at least one of `roles`.
    pub fn roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn requires_authentication(&self) -> bool {
        self.authenticated
    }

    pub fn required_roles(&self) -> &[String] {
        &self.roles
    }

    pub(crate) fn call(
        &self,
        vm: &mut M,
        ctx: &mut ActionContext<'_>,
        args: Arguments,
    ) -> Result<Value> {
        (self.handler)(vm, ctx, args)
    }
}

impl<M> fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("authenticated", &self.authenticated)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}

/// Action name → descriptor. Names are unique per component.
pub struct ActionTable<M> {
    actions: HashMap<String, Action<M>>,
}

impl<M> Default for ActionTable<M> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<M> ActionTable<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: Action<M>) -> Result<()> {
        if self.actions.contains_key(action.name()) {
            bail!("duplicate action name '{}'", action.name());
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Action<M>> {
        self.actions.get(name)
    }

    /// Action names, sorted for stable listings.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// One argument after binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Value(Value),
    File(UploadedFile),
    Files(Vec<UploadedFile>),
}

/// Bound arguments handed to an action handler, positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Bound>,
}

impl Arguments {
    pub(crate) fn new(values: Vec<Bound>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn bound(&self, index: usize) -> Option<&Bound> {
        self.values.get(index)
    }

    /// Deserialize a value argument into `T`.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        match self.values.get(index) {
            Some(Bound::Value(value)) => {
                T::deserialize(value).with_context(|| format!("decode argument {index}"))
            }
            Some(_) => Err(anyhow!("argument {index} is a file, not a value")),
            None => Err(anyhow!("missing argument {index}")),
        }
    }

    pub fn file(&self, index: usize) -> Result<&UploadedFile> {
        match self.values.get(index) {
            Some(Bound::File(file)) => Ok(file),
            _ => Err(anyhow!("argument {index} is not a file")),
        }
    }

    pub fn files(&self, index: usize) -> Result<&[UploadedFile]> {
        match self.values.get(index) {
            Some(Bound::Files(files)) => Ok(files),
            _ => Err(anyhow!("argument {index} is not a file list")),
        }
    }
}

/// Script fragments queued for the client during one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientScript {
    fragments: Vec<String>,
}

impl ClientScript {
    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Concatenate fragments in the order they were pushed.
    pub fn render(&self, separator: &str) -> String {
        self.fragments.join(separator)
    }
}

/// Request-scoped context visible to a running action.
pub struct ActionContext<'a> {
    caller: &'a dyn Caller,
    original: &'a Snapshot,
    script: ClientScript,
}

impl<'a> ActionContext<'a> {
    pub fn new(caller: &'a dyn Caller, original: &'a Snapshot) -> Self {
        Self {
            caller,
            original,
            script: ClientScript::default(),
        }
    }

    pub fn caller(&self) -> &dyn Caller {
        self.caller
    }

    /// State as the client sent it, before this action ran.
    pub fn original(&self) -> &Snapshot {
        self.original
    }

    /// Queue a script fragment for the client.
    pub fn script(&mut self, fragment: impl Into<String>) {
        self.script.push(fragment);
    }

    pub fn into_script(self) -> ClientScript {
        self.script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    enum Status {
        Active,
        Inactive,
    }

    struct Noop;

    fn noop(name: &str) -> Action<Noop> {
        Action::new(name, |_, _, _| Ok(Value::Null))
    }

    #[test]
    fn table_rejects_duplicate_names() {
        let mut table = ActionTable::new();
        table.insert(noop("save")).expect("first insert");
        let err = table.insert(noop("save")).expect_err("duplicate");
        assert!(err.to_string().contains("save"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_lists_names_sorted() {
        let mut table = ActionTable::new();
        for name in ["b", "c", "a"] {
            table.insert(noop(name)).expect("insert");
        }
        assert_eq!(table.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn enum_param_checks_member_names() {
        let Param::Enum { check, .. } = Param::enumeration::<Status>() else {
            panic!("expected enum param");
        };
        assert!(check(&json!("Active")).is_ok());
        assert!(check(&json!("Deleted")).is_err());
    }

    #[test]
    fn arguments_decode_by_position() {
        let args = Arguments::new(vec![
            Bound::Value(json!(3)),
            Bound::Value(json!("Inactive")),
            Bound::File(UploadedFile::new("f", "a.txt", Vec::new())),
        ]);
        assert_eq!(args.get::<i64>(0).expect("int"), 3);
        assert_eq!(args.get::<Status>(1).expect("enum"), Status::Inactive);
        assert_eq!(args.file(2).expect("file").file_name, "a.txt");
        assert!(args.get::<i64>(2).is_err());
        assert!(args.get::<i64>(3).is_err());
    }

    #[test]
    fn script_renders_in_push_order() {
        let mut script = ClientScript::default();
        script.push("a()");
        script.push("b()");
        assert_eq!(script.render("\n"), "a()\nb()");
        assert_eq!(ClientScript::default().render("\n"), "");
    }
}
