//! Deterministic, pure logic shared by the update engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! JSON values and return deterministic outputs suitable for tests.

pub mod coerce;
pub mod diff;
pub mod equality;
pub mod limits;
pub mod types;
