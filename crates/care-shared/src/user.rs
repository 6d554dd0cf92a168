//! Acting user identity and the supervisor capability.
//!
//! Supervisor status is derived once from role membership when the user is
//! constructed, then carried as a plain flag. Every gate reads the flag;
//! nothing re-derives it per action.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable user identifier (an email address in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank identities never match an assignee.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Default roles that grant edit rights independent of ownership.
pub const DEFAULT_SUPERVISOR_ROLES: &[&str] =
    &["supervisor", "care_coordination_supervisor", "admin"];

/// The set of role names that make a user a supervisor.
///
/// Membership in *any* role of the set is sufficient. Role names compare
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorRoles {
    roles: BTreeSet<String>,
}

impl SupervisorRoles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|r| r.as_ref().trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// True if any of `user_roles` is in the set.
    pub fn any_of<S: AsRef<str>>(&self, user_roles: &[S]) -> bool {
        user_roles
            .iter()
            .any(|r| self.roles.contains(&r.as_ref().trim().to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

impl Default for SupervisorRoles {
    fn default() -> Self {
        Self::new(DEFAULT_SUPERVISOR_ROLES)
    }
}

/// The user on whose behalf an action is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub identity: UserId,
    pub is_supervisor: bool,
}

impl ActingUser {
    /// Build a user from their role memberships, computing the supervisor
    /// flag once.
    pub fn from_roles<S: AsRef<str>>(
        identity: impl Into<UserId>,
        roles: &[S],
        supervisor_roles: &SupervisorRoles,
    ) -> Self {
        Self {
            identity: identity.into(),
            is_supervisor: supervisor_roles.any_of(roles),
        }
    }

    pub fn member(identity: impl Into<UserId>) -> Self {
        Self { identity: identity.into(), is_supervisor: false }
    }

    pub fn supervisor(identity: impl Into<UserId>) -> Self {
        Self { identity: identity.into(), is_supervisor: true }
    }
}
