//! Binding of untyped argument tokens to declared parameter shapes.

use serde_json::Value;

use crate::action::{Arguments, Bound, Param};
use crate::core::coerce::coerce_scalar;
use crate::error::UpdateError;
use crate::io::uploads::UploadStore;

/// Bind `tokens` positionally against `params`.
///
/// Callers must have checked that both slices have the same length. Binding
/// stops at the first token that cannot be converted, so a handler never sees
/// partially bound arguments.
pub fn bind_arguments(
    params: &[Param],
    tokens: &[Value],
    files: &dyn UploadStore,
) -> Result<Arguments, UpdateError> {
    let values = params
        .iter()
        .zip(tokens)
        .enumerate()
        .map(|(index, (param, token))| bind_one(index, param, token, files))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arguments::new(values))
}

fn bind_one(
    index: usize,
    param: &Param,
    token: &Value,
    files: &dyn UploadStore,
) -> Result<Bound, UpdateError> {
    let coercion = |reason: String| UpdateError::ArgumentCoercion {
        index,
        expected: param.to_string(),
        reason,
    };

    match param {
        Param::File => {
            let field = field_name(token).map_err(coercion)?;
            files
                .file(&field)
                .map(Bound::File)
                .ok_or(UpdateError::FileNotFound { index, field })
        }
        Param::FileList => {
            let field = field_name(token).map_err(coercion)?;
            Ok(Bound::Files(files.files(&field)))
        }
        Param::Object { check, .. } => {
            check(token).map_err(|err| coercion(err.to_string()))?;
            Ok(Bound::Value(token.clone()))
        }
        Param::Enum { check, .. } => {
            let Value::String(member) = token else {
                return Err(coercion("expected a member name".to_string()));
            };
            check(token).map_err(|_| coercion(format!("'{member}' is not a member")))?;
            Ok(Bound::Value(token.clone()))
        }
        Param::Scalar(kind) => coerce_scalar(*kind, token)
            .map(Bound::Value)
            .map_err(coercion),
    }
}

/// Upload field name carried by a file token.
fn field_name(token: &Value) -> Result<String, String> {
    match token {
        Value::String(name) => Ok(name.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("expected an upload field name".to_string()),
    }
}
