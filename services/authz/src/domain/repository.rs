#![allow(async_fn_in_trait)]

use warden_core::context::RequestContext;
use warden_domain::id::{PermissionId, RoleId, UserId};

use crate::domain::change::{PermissionPatch, RolePatch, UserPatch, UserRolePatch};
use crate::domain::types::{
    Permission, PermissionQuery, Role, RolePermission, RoleQuery, User, UserQuery, UserRole,
};
use crate::error::AuthzError;

/// Every repository call takes the caller's [`RequestContext`]; implementations
/// fail fast on a cancelled context and abandon work when it fires.
///
/// `update` methods follow the locked-update protocol in
/// [`crate::domain::change`]: on success the passed entity becomes the
/// committed row; on failure its `updated_at` is restored and the error returned.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, ctx: &RequestContext, id: UserId)
    -> Result<Option<User>, AuthzError>;

    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError>;

    async fn find_by_reset_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<User>, AuthzError>;

    /// A user with a role binding, looked up by email.
    async fn find_admin_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError>;

    /// One page of the users without a role binding, plus the number of
    /// users matching the filter.
    async fn list(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError>;

    /// Same as [`Self::list`] over the users holding a role binding.
    async fn list_admins(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError>;

    async fn create(&self, ctx: &RequestContext, user: &User) -> Result<(), AuthzError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        user: &mut User,
        patch: &UserPatch,
    ) -> Result<(), AuthzError>;

    /// Hard delete. The user's role binding goes with it in the same
    /// statement. Returns `false` if no such user.
    async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<bool, AuthzError>;
}

/// Roles together with their ordered permission sets. Soft-deleted roles are
/// invisible to every method.
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, ctx: &RequestContext, id: RoleId)
    -> Result<Option<Role>, AuthzError>;

    async fn list(&self, ctx: &RequestContext, query: &RoleQuery)
    -> Result<Vec<Role>, AuthzError>;

    /// Insert the role and one association per permission, atomically.
    async fn create(&self, ctx: &RequestContext, role: &Role) -> Result<(), AuthzError>;

    /// Locked update. A present `permission_ids` replaces the whole set in the
    /// same transaction.
    async fn update(
        &self,
        ctx: &RequestContext,
        role: &mut Role,
        patch: &RolePatch,
    ) -> Result<(), AuthzError>;

    /// Soft-delete the role and its associations, atomically.
    /// Returns `false` if no such live role.
    async fn delete(&self, ctx: &RequestContext, id: RoleId) -> Result<bool, AuthzError>;
}

pub trait PermissionRepository: Send + Sync {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: PermissionId,
    ) -> Result<Option<Permission>, AuthzError>;

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Permission>, AuthzError>;

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &PermissionQuery,
    ) -> Result<Vec<Permission>, AuthzError>;

    async fn create(&self, ctx: &RequestContext, permission: &Permission)
    -> Result<(), AuthzError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        permission: &mut Permission,
        patch: &PermissionPatch,
    ) -> Result<(), AuthzError>;
}

/// Association lookups. Associations are written only through [`RoleRepository`].
pub trait RolePermissionRepository: Send + Sync {
    async fn find_by_pair(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<Option<RolePermission>, AuthzError>;
}

pub trait UserRoleRepository: Send + Sync {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Option<UserRole>, AuthzError>;

    async fn create(&self, ctx: &RequestContext, user_role: &UserRole) -> Result<(), AuthzError>;

    async fn update(
        &self,
        ctx: &RequestContext,
        user_role: &mut UserRole,
        patch: &UserRolePatch,
    ) -> Result<(), AuthzError>;

    /// Remove the binding. Returns `false` if the user had none.
    async fn delete(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthzError>;

    /// The binding went away with its user. Drops anything still derived from it.
    async fn forget(&self, ctx: &RequestContext, user_id: UserId) -> Result<(), AuthzError>;
}

/// TTL key-value side cache.
pub trait AuthzCache: Send + Sync {
    async fn get(&self, ctx: &RequestContext, key: &str) -> Result<Option<Vec<u8>>, AuthzError>;

    async fn set(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), AuthzError>;

    /// Atomically increment an integer counter, creating it at zero first.
    /// Returns the new value.
    async fn incr(&self, ctx: &RequestContext, key: &str) -> Result<u64, AuthzError>;

    /// Remove every key matching a glob pattern (`*` wildcard). Returns the number removed.
    async fn bulk_remove(&self, ctx: &RequestContext, pattern: &str) -> Result<u64, AuthzError>;
}
