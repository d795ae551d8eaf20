//! Locked-update protocol shared by every versioned entity.
//!
//! An update is described by a sparse patch: a field is `Some` only when the
//! caller means to change it. Under the row lock the store narrows the patch
//! against the locked copy, so only fields that really differ are written
//! (plus `updated_at`). Writers touching disjoint fields never overwrite each
//! other, whatever stale copy they started from.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use warden_domain::id::{PermissionId, RoleId};
use warden_domain::user::UserStatus;

use crate::domain::types::{Permission, Role, User, UserRole};
use crate::error::AuthzError;

/// Entity carrying an `updated_at` version stamp.
pub trait Versioned {
    fn updated_at(&self) -> DateTime<Utc>;
    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Sparse set of intended field changes for `E`.
pub trait Patch<E> {
    /// Keep only the fields whose value differs from `current`.
    fn narrow(&self, current: &E) -> Self;
    fn is_empty(&self) -> bool;
    fn apply_to(&self, entity: &mut E);
}

/// Run one locked write of `entity`.
///
/// `entity.updated_at` is advanced to the write time (never backwards) before
/// `write` runs and `write` receives that time. On success `entity` becomes the
/// committed row. On failure the prior stamp is restored and the error is
/// returned. There is exactly one attempt.
pub async fn run_locked_update<E, F, Fut>(entity: &mut E, write: F) -> Result<(), AuthzError>
where
    E: Versioned,
    F: FnOnce(DateTime<Utc>) -> Fut,
    Fut: Future<Output = Result<E, AuthzError>>,
{
    let prior = entity.updated_at();
    let now = Utc::now().max(prior);
    entity.set_updated_at(now);
    match write(now).await {
        Ok(committed) => {
            *entity = committed;
            Ok(())
        }
        Err(e) => {
            entity.set_updated_at(prior);
            Err(e)
        }
    }
}

fn differs<T: PartialEq + Clone>(incoming: &Option<T>, current: &T) -> Option<T> {
    incoming.as_ref().filter(|v| *v != current).cloned()
}

fn assign<T: Clone>(incoming: &Option<T>, target: &mut T) {
    if let Some(v) = incoming {
        *target = v.clone();
    }
}

// ── User ─────────────────────────────────────────────────────────────────────

impl Versioned for User {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub photo: Option<String>,
    pub dob: Option<Option<NaiveDate>>,
    pub otp: Option<Option<String>>,
    pub status: Option<UserStatus>,
    pub forgot_password_token: Option<Option<String>>,
}

impl Patch<User> for UserPatch {
    fn narrow(&self, current: &User) -> Self {
        Self {
            name: differs(&self.name, &current.name),
            email: differs(&self.email, &current.email),
            password: differs(&self.password, &current.password),
            phone_number: differs(&self.phone_number, &current.phone_number),
            photo: differs(&self.photo, &current.photo),
            dob: differs(&self.dob, &current.dob),
            otp: differs(&self.otp, &current.otp),
            status: differs(&self.status, &current.status),
            forgot_password_token: differs(
                &self.forgot_password_token,
                &current.forgot_password_token,
            ),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, user: &mut User) {
        assign(&self.name, &mut user.name);
        assign(&self.email, &mut user.email);
        assign(&self.password, &mut user.password);
        assign(&self.phone_number, &mut user.phone_number);
        assign(&self.photo, &mut user.photo);
        assign(&self.dob, &mut user.dob);
        assign(&self.otp, &mut user.otp);
        assign(&self.status, &mut user.status);
        assign(&self.forgot_password_token, &mut user.forgot_password_token);
    }
}

// ── Role ─────────────────────────────────────────────────────────────────────

impl Versioned for Role {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// `permission_ids`, when present, replaces the role's whole permission set in
/// the given order. It is never narrowed: replacement is always delete-then-recreate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    pub name: Option<String>,
    pub permission_ids: Option<Vec<PermissionId>>,
}

impl Patch<Role> for RolePatch {
    fn narrow(&self, current: &Role) -> Self {
        Self {
            name: differs(&self.name, &current.name),
            permission_ids: self.permission_ids.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.permission_ids.is_none()
    }

    /// Only scalar fields; the permission set is rebuilt by the store.
    fn apply_to(&self, role: &mut Role) {
        assign(&self.name, &mut role.name);
    }
}

// ── Permission ───────────────────────────────────────────────────────────────

impl Versioned for Permission {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPatch {
    pub name: Option<String>,
    pub label: Option<String>,
}

impl Patch<Permission> for PermissionPatch {
    fn narrow(&self, current: &Permission) -> Self {
        Self {
            name: differs(&self.name, &current.name),
            label: differs(&self.label, &current.label),
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.label.is_none()
    }

    fn apply_to(&self, permission: &mut Permission) {
        assign(&self.name, &mut permission.name);
        assign(&self.label, &mut permission.label);
    }
}

// ── UserRole ─────────────────────────────────────────────────────────────────

impl Versioned for UserRole {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRolePatch {
    pub role_id: Option<RoleId>,
}

impl Patch<UserRole> for UserRolePatch {
    fn narrow(&self, current: &UserRole) -> Self {
        Self {
            role_id: differs(&self.role_id, &current.role_id),
        }
    }

    fn is_empty(&self) -> bool {
        self.role_id.is_none()
    }

    fn apply_to(&self, user_role: &mut UserRole) {
        assign(&self.role_id, &mut user_role.role_id);
    }
}
