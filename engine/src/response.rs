//! Response envelope written back to the client.

use std::io::{BufWriter, Write};

use serde::Serialize;
use serde_json::Value;

use crate::core::types::Snapshot;
use crate::error::UpdateError;

/// The three-key envelope: `update`, `script`, `result`, in that order.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub update: &'a Snapshot,
    pub script: &'a str,
    /// Always serialized; a void action yields an explicit `null`.
    pub result: &'a Value,
}

/// Stream `envelope` into `writer` in one pass.
///
/// The writer is consumed, so it is released on every return path.
pub fn write_envelope<W: Write>(writer: W, envelope: &Envelope<'_>) -> Result<(), UpdateError> {
    let mut out = BufWriter::new(writer);
    serde_json::to_writer(&mut out, envelope).map_err(UpdateError::Encode)?;
    out.flush()?;
    Ok(())
}
