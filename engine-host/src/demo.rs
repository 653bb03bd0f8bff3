//! Sample components served by the host.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use engine::{Action, Component, Param, ViewModel};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::state::Registry;

#[derive(Debug, Default)]
pub struct Counter {
    count: i64,
    step: i64,
    history: Vec<i64>,
}

impl ViewModel for Counter {}

fn counter() -> Result<Component<Counter>> {
    Component::builder("counter", || Counter {
        step: 1,
        ..Counter::default()
    })
    .field("count", |m: &Counter| &m.count, |m: &mut Counter| &mut m.count)
    .field("step", |m: &Counter| &m.step, |m: &mut Counter| &mut m.step)
    .field("history", |m: &Counter| &m.history, |m: &mut Counter| &mut m.history)
    .action(Action::new("increment", |vm: &mut Counter, ctx, _| {
        vm.history.push(vm.count);
        vm.count = vm
            .count
            .checked_add(vm.step)
            .ok_or_else(|| anyhow!("counter overflow"))?;
        if vm.count % 10 == 0 {
            ctx.script(format!("alert('reached {}')", vm.count));
        }
        Ok(Value::Null)
    }))
    .action(
        Action::new("add", |vm: &mut Counter, _, args| {
            let amount: i64 = args.get(0)?;
            vm.history.push(vm.count);
            vm.count = vm
                .count
                .checked_add(amount)
                .ok_or_else(|| anyhow!("counter overflow"))?;
            Ok(json!(vm.count))
        })
        .param(Param::INT),
    )
    .action(
        Action::new("reset", |vm: &mut Counter, _, _| {
            vm.count = 0;
            vm.history.clear();
            Ok(Value::Null)
        })
        .authenticated(),
    )
    .action(
        Action::new("set_step", |vm: &mut Counter, ctx, args| {
            vm.step = args.get(0)?;
            let who = ctx.caller().name().unwrap_or("someone").to_string();
            ctx.script(format!("console.log('step changed by {who}')"));
            Ok(Value::Null)
        })
        .param(Param::INT)
        .roles(["admin"]),
    )
    .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Free,
    Pro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

#[derive(Debug)]
pub struct Profile {
    name: String,
    tier: Tier,
    address: Option<Address>,
    tags: Vec<String>,
    avatar: Option<String>,
}

impl ViewModel for Profile {}

fn profile() -> Result<Component<Profile>> {
    Component::builder("profile", || Profile {
        name: String::new(),
        tier: Tier::Free,
        address: None,
        tags: Vec::new(),
        avatar: None,
    })
    .field("name", |m: &Profile| &m.name, |m: &mut Profile| &mut m.name)
    .field("tier", |m: &Profile| &m.tier, |m: &mut Profile| &mut m.tier)
    .field("address", |m: &Profile| &m.address, |m: &mut Profile| &mut m.address)
    .field("tags", |m: &Profile| &m.tags, |m: &mut Profile| &mut m.tags)
    .field("avatar", |m: &Profile| &m.avatar, |m: &mut Profile| &mut m.avatar)
    .action(
        Action::new("rename", |vm: &mut Profile, ctx, args| {
            let before = ctx
                .original()
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            vm.name = args.get(0)?;
            Ok(json!({ "previous": before }))
        })
        .param(Param::STR),
    )
    .action(
        Action::new("move_to", |vm: &mut Profile, _, args| {
            vm.address = Some(args.get(0)?);
            Ok(Value::Null)
        })
        .param(Param::object::<Address>())
        .authenticated(),
    )
    .action(
        Action::new("set_tier", |vm: &mut Profile, _, args| {
            vm.tier = args.get(0)?;
            Ok(Value::Null)
        })
        .param(Param::enumeration::<Tier>())
        .roles(["admin", "billing"]),
    )
    .action(
        Action::new("tag", |vm: &mut Profile, _, args| {
            let tag: String = args.get(0)?;
            if !vm.tags.contains(&tag) {
                vm.tags.push(tag);
            }
            Ok(json!(vm.tags.len()))
        })
        .param(Param::STR),
    )
    .action(
        Action::new("set_avatar", |vm: &mut Profile, _, args| {
            let file = args.file(0)?;
            vm.avatar = Some(file.file_name.clone());
            Ok(json!({ "bytes": file.len() }))
        })
        .param(Param::File),
    )
    .build()
}

/// Registry with every sample component.
pub fn registry() -> Result<Registry> {
    let mut registry = Registry::default();
    registry.register(Arc::new(counter()?))?;
    registry.register(Arc::new(profile()?))?;
    Ok(registry)
}
