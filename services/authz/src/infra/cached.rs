//! Read-through caching decorators over the store repositories.
//!
//! Reads try the cache first and fall back to the store on a miss, an
//! unreadable snapshot or a cache failure, then populate the cache. Absent
//! rows are never cached.
//!
//! Writes go to the store first. Once it has committed, every key family the
//! write could have made stale is retired: its generation counter moves on
//! and its entries are removed. A failed invalidation fails the write.
//!
//! | Mutation | Families removed |
//! |----------|------------------|
//! | role create / update / delete | role-by-id, role-permission-by-pair |
//! | permission create | permission-by-name |
//! | permission update | permission-by-name, role-by-id |
//! | user-role create / update / delete | user-role-by-user-id |
//! | user delete (binding cascades) | user-role-by-user-id |

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use warden_core::context::RequestContext;
use warden_domain::id::{PermissionId, RoleId, UserId};

use crate::domain::change::{PermissionPatch, RolePatch, UserRolePatch};
use crate::domain::repository::{
    AuthzCache, PermissionRepository, RolePermissionRepository, RoleRepository,
    UserRoleRepository,
};
use crate::domain::types::{
    Permission, PermissionQuery, Role, RolePermission, RoleQuery, UserRole,
};
use crate::error::AuthzError;
use crate::infra::keys::{CacheKeys, KeyFamily};

/// Cache handle plus key layout and TTL, shared by every decorator.
#[derive(Clone)]
pub struct CacheLayer<C> {
    pub cache: C,
    pub keys: CacheKeys,
    pub ttl_secs: u64,
}

impl<C: AuthzCache> CacheLayer<C> {
    /// Serve `family` entries from the cache, loading and populating on a miss.
    ///
    /// `key` builds the entry key for a generation. The generation is read
    /// before the load, so a load that races a write populates a retired key.
    pub async fn read_through<T, K, F, Fut>(
        &self,
        ctx: &RequestContext,
        family: KeyFamily,
        key: K,
        load: F,
    ) -> Result<Option<T>, AuthzError>
    where
        T: Serialize + DeserializeOwned,
        K: FnOnce(u64) -> String,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, AuthzError>>,
    {
        let Some(generation) = self.generation(ctx, family).await? else {
            return load().await;
        };
        let key = key(generation);

        match self.cache.get(ctx, &key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => warn!(key = %key, error = %e, "unreadable cache snapshot, reloading"),
            },
            Ok(None) => {}
            Err(AuthzError::Cancelled) => return Err(AuthzError::Cancelled),
            Err(e) => warn!(key = %key, error = ?e, "cache read failed, falling back to store"),
        }

        let value = load().await?;
        if let Some(v) = &value {
            self.populate(ctx, &key, v).await;
        }
        Ok(value)
    }

    /// Current generation of a family, `None` when it cannot be read.
    async fn generation(
        &self,
        ctx: &RequestContext,
        family: KeyFamily,
    ) -> Result<Option<u64>, AuthzError> {
        let key = self.keys.generation(family);
        match self.cache.get(ctx, &key).await {
            Ok(None) => Ok(Some(0)),
            Ok(Some(bytes)) => {
                let parsed = std::str::from_utf8(&bytes)
                    .ok()
                    .and_then(|s| s.parse().ok());
                if parsed.is_none() {
                    warn!(key = %key, "unreadable generation counter, bypassing cache");
                }
                Ok(parsed)
            }
            Err(AuthzError::Cancelled) => Err(AuthzError::Cancelled),
            Err(e) => {
                warn!(key = %key, error = ?e, "cache read failed, falling back to store");
                Ok(None)
            }
        }
    }

    async fn populate<T: Serialize>(&self, ctx: &RequestContext, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "cache snapshot encode failed");
                return;
            }
        };
        if let Err(e) = self.cache.set(ctx, key, &bytes, self.ttl_secs).await {
            warn!(key, error = ?e, "cache populate failed");
        }
    }

    /// Retire whole key families after a committed write.
    ///
    /// The generation moves first, so readers that loaded before the write
    /// can only populate keys nobody reads any more. The old entries are then
    /// removed.
    pub async fn invalidate(
        &self,
        ctx: &RequestContext,
        families: &[KeyFamily],
    ) -> Result<(), AuthzError> {
        // The write has already committed; a caller going away must not leave stale entries.
        let ctx = ctx.detached();
        for &family in families {
            let generation = self.cache.incr(&ctx, &self.keys.generation(family)).await?;
            let pattern = self.keys.pattern(family);
            let removed = self.cache.bulk_remove(&ctx, &pattern).await?;
            debug!(pattern = %pattern, generation, removed, "cache family invalidated");
        }
        Ok(())
    }
}

const ROLE_FAMILIES: [KeyFamily; 2] = [KeyFamily::Role, KeyFamily::RolePermission];

// ── Roles ────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CachedRoleRepository<R, C> {
    pub inner: R,
    pub layer: CacheLayer<C>,
}

impl<R: RoleRepository, C: AuthzCache> RoleRepository for CachedRoleRepository<R, C> {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: RoleId,
    ) -> Result<Option<Role>, AuthzError> {
        let keys = &self.layer.keys;
        self.layer
            .read_through(
                ctx,
                KeyFamily::Role,
                |g| keys.role_by_id(g, id),
                || self.inner.find_by_id(ctx, id),
            )
            .await
    }

    async fn list(&self, ctx: &RequestContext, query: &RoleQuery) -> Result<Vec<Role>, AuthzError> {
        self.inner.list(ctx, query).await
    }

    async fn create(&self, ctx: &RequestContext, role: &Role) -> Result<(), AuthzError> {
        self.inner.create(ctx, role).await?;
        self.layer.invalidate(ctx, &ROLE_FAMILIES).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        role: &mut Role,
        patch: &RolePatch,
    ) -> Result<(), AuthzError> {
        self.inner.update(ctx, role, patch).await?;
        self.layer.invalidate(ctx, &ROLE_FAMILIES).await
    }

    async fn delete(&self, ctx: &RequestContext, id: RoleId) -> Result<bool, AuthzError> {
        let deleted = self.inner.delete(ctx, id).await?;
        if deleted {
            self.layer.invalidate(ctx, &ROLE_FAMILIES).await?;
        }
        Ok(deleted)
    }
}

// ── Permissions ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CachedPermissionRepository<P, C> {
    pub inner: P,
    pub layer: CacheLayer<C>,
}

impl<P: PermissionRepository, C: AuthzCache> PermissionRepository
    for CachedPermissionRepository<P, C>
{
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: PermissionId,
    ) -> Result<Option<Permission>, AuthzError> {
        self.inner.find_by_id(ctx, id).await
    }

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Permission>, AuthzError> {
        let keys = &self.layer.keys;
        self.layer
            .read_through(
                ctx,
                KeyFamily::Permission,
                |g| keys.permission_by_name(g, name),
                || self.inner.find_by_name(ctx, name),
            )
            .await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &PermissionQuery,
    ) -> Result<Vec<Permission>, AuthzError> {
        self.inner.list(ctx, query).await
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        permission: &Permission,
    ) -> Result<(), AuthzError> {
        self.inner.create(ctx, permission).await?;
        self.layer
            .invalidate(ctx, &[KeyFamily::Permission])
            .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        permission: &mut Permission,
        patch: &PermissionPatch,
    ) -> Result<(), AuthzError> {
        self.inner.update(ctx, permission, patch).await?;
        // Role snapshots embed their permissions.
        self.layer
            .invalidate(ctx, &[KeyFamily::Permission, KeyFamily::Role])
            .await
    }
}

// ── Role-permission pairs ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CachedRolePermissionRepository<RP, C> {
    pub inner: RP,
    pub layer: CacheLayer<C>,
}

impl<RP: RolePermissionRepository, C: AuthzCache> RolePermissionRepository
    for CachedRolePermissionRepository<RP, C>
{
    async fn find_by_pair(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<Option<RolePermission>, AuthzError> {
        let keys = &self.layer.keys;
        self.layer
            .read_through(
                ctx,
                KeyFamily::RolePermission,
                |g| keys.role_permission_by_pair(g, role_id, permission_id),
                || self.inner.find_by_pair(ctx, role_id, permission_id),
            )
            .await
    }
}

// ── User roles ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CachedUserRoleRepository<UR, C> {
    pub inner: UR,
    pub layer: CacheLayer<C>,
}

impl<UR: UserRoleRepository, C: AuthzCache> UserRoleRepository for CachedUserRoleRepository<UR, C> {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Option<UserRole>, AuthzError> {
        let keys = &self.layer.keys;
        self.layer
            .read_through(
                ctx,
                KeyFamily::UserRole,
                |g| keys.user_role_by_user_id(g, user_id),
                || self.inner.find_by_user_id(ctx, user_id),
            )
            .await
    }

    async fn create(&self, ctx: &RequestContext, user_role: &UserRole) -> Result<(), AuthzError> {
        self.inner.create(ctx, user_role).await?;
        self.layer
            .invalidate(ctx, &[KeyFamily::UserRole])
            .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user_role: &mut UserRole,
        patch: &UserRolePatch,
    ) -> Result<(), AuthzError> {
        self.inner.update(ctx, user_role, patch).await?;
        self.layer
            .invalidate(ctx, &[KeyFamily::UserRole])
            .await
    }

    async fn delete(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthzError> {
        let deleted = self.inner.delete(ctx, user_id).await?;
        if deleted {
            self.layer
                .invalidate(ctx, &[KeyFamily::UserRole])
                .await?;
        }
        Ok(deleted)
    }

    async fn forget(&self, ctx: &RequestContext, user_id: UserId) -> Result<(), AuthzError> {
        self.inner.forget(ctx, user_id).await?;
        self.layer.invalidate(ctx, &[KeyFamily::UserRole]).await
    }
}
