//! Test-only fixtures: a counter component and request helpers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::action::{Action, Param};
use crate::component::{Component, ViewModel};
use crate::core::types::UpdateRequest;
use crate::error::UpdateError;
use crate::io::config::EngineConfig;
use crate::io::identity::Identity;
use crate::io::uploads::FileCollection;
use crate::update::{RequestEnv, update};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Active,
    Paused,
}

/// Shared counters observed by tests after the view-model is gone.
#[derive(Debug, Clone, Default)]
pub struct Probes {
    pub disposals: Arc<AtomicUsize>,
    pub invocations: Arc<AtomicUsize>,
}

impl Probes {
    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

/// Counter view-model with one field of every interesting shape.
#[derive(Debug)]
pub struct Counter {
    pub count: i64,
    pub status: Option<Status>,
    pub avatar: Option<String>,
    probes: Probes,
}

impl Counter {
    fn touch(&self) {
        self.probes.invocations.fetch_add(1, Ordering::SeqCst);
    }
}

impl ViewModel for Counter {
    fn dispose(&mut self) {
        self.probes.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counter component with:
/// - `increment()`: count += 1, queues `alert(1)`.
/// - `add(n: int) -> count`.
/// - `set_status(status: Status)`.
/// - `upload(avatar: file) -> size`.
/// - `reset()`: authenticated callers only.
/// - `wipe()`: `admin` role only.
/// - `fail()`: always errors.
pub fn counter_component(probes: Probes) -> Component<Counter> {
    Component::builder("counter", move || Counter {
        count: 0,
        status: None,
        avatar: None,
        probes: probes.clone(),
    })
    .field("count", |m: &Counter| &m.count, |m: &mut Counter| &mut m.count)
    .field("status", |m: &Counter| &m.status, |m: &mut Counter| &mut m.status)
    .field("avatar", |m: &Counter| &m.avatar, |m: &mut Counter| &mut m.avatar)
    .action(Action::new("increment", |vm: &mut Counter, ctx, _| {
        vm.touch();
        vm.count += 1;
        ctx.script("alert(1)");
        Ok(Value::Null)
    }))
    .action(
        Action::new("add", |vm: &mut Counter, _, args| {
            vm.touch();
            vm.count += args.get::<i64>(0)?;
            Ok(json!(vm.count))
        })
        .param(Param::INT),
    )
    .action(
        Action::new("set_status", |vm: &mut Counter, _, args| {
            vm.touch();
            vm.status = Some(args.get(0)?);
            Ok(Value::Null)
        })
        .param(Param::enumeration::<Status>()),
    )
    .action(
        Action::new("upload", |vm: &mut Counter, _, args| {
            vm.touch();
            let file = args.file(0)?;
            vm.avatar = Some(file.file_name.clone());
            Ok(json!(file.len()))
        })
        .param(Param::File),
    )
    .action(
        Action::new("reset", |vm: &mut Counter, _, _| {
            vm.touch();
            vm.count = 0;
            Ok(Value::Null)
        })
        .authenticated(),
    )
    .action(
        Action::new("wipe", |vm: &mut Counter, _, _| {
            vm.touch();
            vm.count = 0;
            vm.status = None;
            Ok(Value::Null)
        })
        .roles(["admin"]),
    )
    .action(Action::new("fail", |vm: &mut Counter, _, _| {
        vm.touch();
        vm.count = -1;
        Err(anyhow!("counter refused"))
    }))
    .build()
    .expect("counter component")
}

/// Outcome of one update: the engine result and whatever was written.
#[derive(Debug)]
pub struct Exchange {
    pub result: Result<(), UpdateError>,
    pub body: String,
}

impl Exchange {
    /// Parse the written envelope.
    pub fn envelope(&self) -> Value {
        serde_json::from_str(&self.body).expect("envelope json")
    }
}

/// Run `request` against a fresh counter with default config.
pub fn exchange(
    component: &Component<Counter>,
    request: &UpdateRequest,
    caller: &Identity,
    files: &FileCollection,
) -> Exchange {
    let env = RequestEnv::new(caller, files);
    let mut out = Vec::new();
    let result = update(
        component,
        component.instantiate(),
        request,
        &env,
        &EngineConfig::default(),
        &mut out,
    );
    Exchange {
        result,
        body: String::from_utf8(out).expect("utf8 body"),
    }
}
