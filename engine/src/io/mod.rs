//! Boundary collaborators and on-disk configuration.
//!
//! Caller identity and uploaded files are supplied by the host per request;
//! the engine only reads from them.

pub mod config;
pub mod identity;
pub mod uploads;
