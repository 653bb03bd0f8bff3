//! Population of a fresh view-model from client-submitted state.

use serde_json::Value;
use tracing::debug;

use crate::component::Schema;
use crate::core::limits::exceeds_depth;
use crate::core::types::Snapshot;
use crate::error::UpdateError;

/// Apply `data`, then `props`, onto `vm` and capture the original snapshot.
///
/// Only declared fields are written. Keys the schema does not declare are
/// ignored, and declared fields missing from both blobs keep the value the
/// factory gave them. `props` wins when both blobs carry the same field.
pub fn merge<M: 'static>(
    schema: &Schema<M>,
    vm: &mut M,
    data: &Value,
    props: &Value,
    max_depth: usize,
) -> Result<Snapshot, UpdateError> {
    check_blob("data", data, max_depth)?;
    check_blob("props", props, max_depth)?;

    let from_data = populate(schema, vm, data)?;
    let from_props = populate(schema, vm, props)?;
    debug!(from_data, from_props, "merged client state");

    schema.snapshot(vm)
}

fn check_blob(label: &str, blob: &Value, max_depth: usize) -> Result<(), UpdateError> {
    match blob {
        Value::Null | Value::Object(_) => {}
        _ => {
            return Err(UpdateError::InvalidPayload {
                reason: format!("{label} must be a JSON object"),
            });
        }
    }
    if exceeds_depth(blob, max_depth) {
        return Err(UpdateError::InvalidPayload {
            reason: format!("{label} nests deeper than {max_depth} levels"),
        });
    }
    Ok(())
}

/// Write every declared field present in `blob`. Returns how many were written.
fn populate<M: 'static>(schema: &Schema<M>, vm: &mut M, blob: &Value) -> Result<usize, UpdateError> {
    let Value::Object(members) = blob else {
        return Ok(0);
    };

    let mut written = 0;
    for field in schema.fields() {
        let Some(value) = members.get(field.name()) else {
            continue;
        };
        field
            .write(vm, value)
            .map_err(|source| UpdateError::FieldMerge {
                field: field.name().to_string(),
                source,
            })?;
        written += 1;
    }
    Ok(written)
}
