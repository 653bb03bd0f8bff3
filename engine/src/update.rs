//! Orchestration for a single component update.
//!
//! merge → snapshot → invoke → snapshot → diff → write. The view-model is
//! owned by a disposal guard for the whole sequence, so `ViewModel::dispose`
//! runs exactly once on every exit path, including panics and dropped
//! futures in async hosts.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use tracing::{debug, instrument};

use crate::action::ActionContext;
use crate::component::{Component, ViewModel};
use crate::core::diff::diff;
use crate::core::types::UpdateRequest;
use crate::error::UpdateError;
use crate::invoke::execute;
use crate::io::config::EngineConfig;
use crate::io::identity::Caller;
use crate::io::uploads::UploadStore;
use crate::merge::merge;
use crate::response::{Envelope, write_envelope};

/// Collaborators the host supplies for one request.
#[derive(Clone, Copy)]
pub struct RequestEnv<'a> {
    pub caller: &'a dyn Caller,
    pub files: &'a dyn UploadStore,
}

impl<'a> RequestEnv<'a> {
    pub fn new(caller: &'a dyn Caller, files: &'a dyn UploadStore) -> Self {
        Self { caller, files }
    }
}

/// Owns the view-model and disposes it when dropped.
struct Disposal<M: ViewModel> {
    vm: M,
}

impl<M: ViewModel> Deref for Disposal<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.vm
    }
}

impl<M: ViewModel> DerefMut for Disposal<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.vm
    }
}

impl<M: ViewModel> Drop for Disposal<M> {
    fn drop(&mut self) {
        self.vm.dispose();
    }
}

/// Execute `request` against `vm` and write the `{update, script, result}`
/// envelope to `writer`.
///
/// Nothing is written unless every stage before the write succeeded.
#[instrument(skip_all, fields(component = component.name(), action = %request.method))]
pub fn update<M: ViewModel, W: Write>(
    component: &Component<M>,
    vm: M,
    request: &UpdateRequest,
    env: &RequestEnv<'_>,
    config: &EngineConfig,
    writer: W,
) -> Result<(), UpdateError> {
    let mut vm = Disposal { vm };

    let original = merge(
        component.schema(),
        &mut *vm,
        &request.data,
        &request.props,
        config.max_payload_depth,
    )?;

    let mut ctx = ActionContext::new(env.caller, &original);
    let result = execute(
        component.actions(),
        &request.method,
        &mut *vm,
        &mut ctx,
        &request.params,
        env.files,
    )?;
    let script = ctx.into_script();

    let current = component.schema().snapshot(&*vm)?;
    let changes = diff(&original, &current);
    debug!(
        changed = changes.len(),
        fragments = script.fragments().len(),
        "computed update"
    );

    let script = script.render(&config.script_separator);
    write_envelope(
        writer,
        &Envelope {
            update: &changes,
            script: &script,
            result: &result,
        },
    )
}
