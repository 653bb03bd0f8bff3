//! Server-side update engine for reactive view-model components.
//!
//! One update request reconstructs a component's view-model from client
//! state, runs a named server action under an authorization gate, and answers
//! with the minimal set of changed fields. The crate enforces a strict
//! separation:
//!
//! - **[`core`]**: Pure, deterministic logic (deep equality, diffing, scalar
//!   coercion). No I/O, fully testable in isolation.
//! - **[`io`]**: Boundary collaborators (caller identity, uploads) and
//!   on-disk configuration.
//!
//! Orchestration modules ([`merge`], [`invoke`], [`update`]) compose core
//! logic with the collaborators a host supplies per request.

pub mod action;
pub mod bind;
pub mod component;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod invoke;
pub mod io;
pub mod logging;
pub mod merge;
pub mod response;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod update;

pub use action::{Action, ActionContext, Arguments, Param};
pub use component::{Component, Endpoint, ViewModel};
pub use crate::core::types::{Snapshot, UpdateRequest};
pub use error::UpdateError;
pub use update::{RequestEnv, update};
