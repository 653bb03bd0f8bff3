//! Stable exit codes for the `engine` CLI.

/// Command succeeded; for `engine diff`, the snapshots are equal.
pub const OK: i32 = 0;
/// Command failed due to unreadable input, invalid JSON or invalid config.
pub const INVALID: i32 = 1;
/// `engine diff` found at least one changed field.
pub const CHANGED: i32 = 2;
