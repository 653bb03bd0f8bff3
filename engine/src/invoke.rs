//! Resolution, authorization and invocation of a named action.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::action::{Action, ActionContext, ActionTable};
use crate::bind::bind_arguments;
use crate::error::UpdateError;
use crate::io::identity::Caller;
use crate::io::uploads::UploadStore;

/// Resolve `name` in `table`, authorize the caller, bind `tokens` and run the
/// action against `vm`.
///
/// Every check happens before the handler runs; a rejected request leaves
/// `vm` untouched. Handler errors are returned as [`UpdateError::Invocation`]
/// without retry.
#[instrument(skip_all, fields(action = name, tokens = tokens.len()))]
pub fn execute<M>(
    table: &ActionTable<M>,
    name: &str,
    vm: &mut M,
    ctx: &mut ActionContext<'_>,
    tokens: &[Value],
    files: &dyn UploadStore,
) -> Result<Value, UpdateError> {
    let action = table.get(name).ok_or_else(|| {
        warn!("action not found");
        UpdateError::ActionNotFound {
            action: name.to_string(),
        }
    })?;

    authorize(action, ctx.caller())?;

    let params = action.params();
    if params.len() != tokens.len() {
        return Err(UpdateError::ArgumentCountMismatch {
            action: name.to_string(),
            expected: params.len(),
            actual: tokens.len(),
        });
    }
    let args = bind_arguments(params, tokens, files)?;

    debug!("invoking action");
    action
        .call(vm, ctx, args)
        .map_err(|source| UpdateError::Invocation {
            action: name.to_string(),
            source,
        })
}

/// Authentication first, then role membership.
fn authorize<M>(action: &Action<M>, caller: &dyn Caller) -> Result<(), UpdateError> {
    if action.requires_authentication() && !caller.is_authenticated() {
        warn!("rejected unauthenticated caller");
        return Err(UpdateError::AuthenticationRequired);
    }

    let roles = action.required_roles();
    if !roles.is_empty() && !roles.iter().any(|role| caller.is_in_role(role)) {
        warn!(
            caller = caller.name().unwrap_or("<anonymous>"),
            "rejected caller without role"
        );
        return Err(UpdateError::Forbidden {
            roles: roles.to_vec(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Param;
    use crate::core::types::Snapshot;
    use crate::io::identity::Identity;
    use crate::io::uploads::FileCollection;
    use anyhow::anyhow;
    use serde_json::json;

    #[derive(Default)]
    struct Account {
        balance: i64,
        calls: u32,
    }

    fn table() -> ActionTable<Account> {
        let mut table = ActionTable::new();
        table
            .insert(
                Action::new("deposit", |vm: &mut Account, _, args| {
                    vm.calls += 1;
                    vm.balance += args.get::<i64>(0)?;
                    Ok(json!(vm.balance))
                })
                .param(Param::INT),
            )
            .expect("deposit");
        table
            .insert(
                Action::new("close", |vm: &mut Account, _, _| {
                    vm.calls += 1;
                    Ok(Value::Null)
                })
                .authenticated(),
            )
            .expect("close");
        table
            .insert(
                Action::new("audit", |vm: &mut Account, _, _| {
                    vm.calls += 1;
                    Ok(json!("audited"))
                })
                .roles(["admin"]),
            )
            .expect("audit");
        table
            .insert(Action::new("explode", |vm: &mut Account, _, _| {
                vm.calls += 1;
                Err(anyhow!("boom"))
            }))
            .expect("explode");
        table
    }

    fn run(
        name: &str,
        caller: &Identity,
        tokens: &[Value],
        vm: &mut Account,
    ) -> Result<Value, UpdateError> {
        let original = Snapshot::new();
        let mut ctx = ActionContext::new(caller, &original);
        execute(&table(), name, vm, &mut ctx, tokens, &FileCollection::new())
    }

    #[test]
    fn executes_with_bound_arguments() {
        let mut vm = Account::default();
        let result = run("deposit", &Identity::anonymous(), &[json!("5")], &mut vm).expect("ok");
        assert_eq!(result, json!(5));
        assert_eq!(vm.balance, 5);
    }

    #[test]
    fn unknown_action_is_not_found() {
        let mut vm = Account::default();
        let err = run("withdraw", &Identity::anonymous(), &[], &mut vm).expect_err("missing");
        assert!(matches!(err, UpdateError::ActionNotFound { ref action } if action == "withdraw"));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn unauthenticated_caller_never_runs_protected_action() {
        let mut vm = Account::default();
        let err = run("close", &Identity::anonymous(), &[], &mut vm).expect_err("401");
        assert!(matches!(err, UpdateError::AuthenticationRequired));
        assert_eq!(vm.calls, 0);

        run("close", &Identity::authenticated("ana"), &[], &mut vm).expect("authenticated");
        assert_eq!(vm.calls, 1);
    }

    #[test]
    fn role_gate_lists_accepted_roles() {
        let mut vm = Account::default();
        let user = Identity::authenticated("ana").with_roles(["user"]);
        let err = run("audit", &user, &[], &mut vm).expect_err("403");
        assert!(matches!(err, UpdateError::Forbidden { ref roles } if roles == &["admin"]));
        assert!(err.to_string().contains("`admin`"));
        assert_eq!(vm.calls, 0);

        let admin = Identity::authenticated("root").with_roles(["admin"]);
        assert_eq!(run("audit", &admin, &[], &mut vm).expect("admin"), json!("audited"));
    }

    #[test]
    fn argument_count_must_match() {
        let mut vm = Account::default();
        let err = run("deposit", &Identity::anonymous(), &[], &mut vm).expect_err("count");
        assert!(matches!(
            err,
            UpdateError::ArgumentCountMismatch {
                expected: 1,
                actual: 0,
                ..
            }
        ));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn coercion_failure_aborts_before_invocation() {
        let mut vm = Account::default();
        let err = run("deposit", &Identity::anonymous(), &[json!([1])], &mut vm)
            .expect_err("coercion");
        assert!(matches!(err, UpdateError::ArgumentCoercion { .. }));
        assert_eq!(vm.calls, 0);
    }

    #[test]
    fn handler_error_propagates_as_invocation_fault() {
        let mut vm = Account::default();
        let err = run("explode", &Identity::anonymous(), &[], &mut vm).expect_err("fault");
        assert!(matches!(err, UpdateError::Invocation { ref action, .. } if action == "explode"));
        assert_eq!(vm.calls, 1);
    }
}
