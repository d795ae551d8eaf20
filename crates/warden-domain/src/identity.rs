//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Which credential issuer vouched for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// End-user credential.
    User,
    /// Administrative (CMS) credential.
    Admin,
}

/// Subject established by an access gate for the lifetime of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub scope: Scope,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.scope == Scope::Admin
    }
}
