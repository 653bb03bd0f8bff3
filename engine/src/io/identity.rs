//! Caller identity as seen by the authorization gate.

use std::collections::BTreeSet;

/// Read-only view of the principal issuing an update request.
pub trait Caller {
    fn is_authenticated(&self) -> bool;
    fn is_in_role(&self, role: &str) -> bool;
    fn name(&self) -> Option<&str> {
        None
    }
}

/// In-memory caller identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    name: Option<String>,
    roles: BTreeSet<String>,
}

impl Identity {
    /// An unauthenticated caller holding no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            roles: BTreeSet::new(),
        }
    }

    /// Grant roles. Roles on an anonymous identity are ignored by
    /// [`Caller::is_in_role`].
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }
}

impl Caller for Identity {
    fn is_authenticated(&self) -> bool {
        self.name.is_some()
    }

    fn is_in_role(&self, role: &str) -> bool {
        self.is_authenticated() && self.roles.contains(role)
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
