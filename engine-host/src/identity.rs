//! Demo caller identity provider backed by request headers.
//!
//! `x-user` names an authenticated caller; `x-roles` carries a comma-separated
//! role list. A real deployment replaces this with its session layer.

use axum::http::HeaderMap;
use engine::io::identity::Identity;

pub const USER_HEADER: &str = "x-user";
pub const ROLES_HEADER: &str = "x-roles";

pub fn caller_from_headers(headers: &HeaderMap) -> Identity {
    let user = headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|user| !user.is_empty());

    let Some(user) = user else {
        return Identity::anonymous();
    };

    let roles = headers
        .get(ROLES_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty());

    Identity::authenticated(user).with_roles(roles)
}
