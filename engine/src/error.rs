//! Failures surfaced by the update pipeline.

use thiserror::Error;

/// Errors emitted while handling one update request.
///
/// Every variant maps to an HTTP-style status via [`UpdateError::status_code`]
/// so hosts can translate failures without matching on variants.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// A `data`/`props` blob had the wrong shape or exceeded structural limits.
    #[error("invalid payload: {reason}")]
    InvalidPayload { reason: String },
    /// A declared field could not be populated from the client value.
    #[error("cannot populate field `{field}`")]
    FieldMerge {
        field: String,
        #[source]
        source: serde_json::Error,
    },
    /// The action table has no entry under this name.
    #[error("action `{action}` not found")]
    ActionNotFound { action: String },
    /// The action requires an authenticated caller.
    #[error("authentication required")]
    AuthenticationRequired,
    /// The caller holds none of the roles the action accepts.
    #[error("forbidden: action requires one of the roles {}", quote_roles(.roles))]
    Forbidden { roles: Vec<String> },
    #[error("action `{action}` expects {expected} argument(s), got {actual}")]
    ArgumentCountMismatch {
        action: String,
        expected: usize,
        actual: usize,
    },
    /// A token could not be converted to the declared parameter shape.
    #[error("argument {index} ({expected}): {reason}")]
    ArgumentCoercion {
        index: usize,
        expected: String,
        reason: String,
    },
    /// A file parameter named an upload that was not submitted.
    #[error("argument {index}: no uploaded file under field `{field}`")]
    FileNotFound { index: usize, field: String },
    /// The action body itself failed.
    #[error("action `{action}` failed")]
    Invocation {
        action: String,
        #[source]
        source: anyhow::Error,
    },
    /// A declared field could not be serialized into the snapshot.
    #[error("cannot snapshot field `{field}`")]
    Snapshot {
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode response")]
    Encode(#[source] serde_json::Error),
    #[error("write response")]
    Io(#[from] std::io::Error),
}

impl UpdateError {
    /// Status code a host should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            UpdateError::InvalidPayload { .. }
            | UpdateError::FieldMerge { .. }
            | UpdateError::ArgumentCountMismatch { .. }
            | UpdateError::ArgumentCoercion { .. }
            | UpdateError::FileNotFound { .. } => 400,
            UpdateError::AuthenticationRequired => 401,
            UpdateError::Forbidden { .. } => 403,
            UpdateError::ActionNotFound { .. } => 404,
            UpdateError::Invocation { .. }
            | UpdateError::Snapshot { .. }
            | UpdateError::Encode(_)
            | UpdateError::Io(_) => 500,
        }
    }
}

fn quote_roles(roles: &[String]) -> String {
    roles
        .iter()
        .map(|role| format!("`{role}`"))
        .collect::<Vec<_>>()
        .join(", ")
}
