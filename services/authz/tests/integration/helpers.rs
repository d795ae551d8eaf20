use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use warden_authz::domain::change::{
    Patch, PermissionPatch, RolePatch, UserPatch, UserRolePatch, run_locked_update,
};
use warden_authz::domain::repository::{
    AuthzCache, PermissionRepository, RolePermissionRepository, RoleRepository, UserRepository,
    UserRoleRepository,
};
use warden_authz::domain::types::{
    GrantedPermission, Permission, PermissionQuery, Role, RolePermission, RoleQuery, SortOrder,
    User, UserQuery, UserRole, UserSort,
};
use warden_authz::error::AuthzError;
use warden_authz::infra::cached::{
    CacheLayer, CachedPermissionRepository, CachedRolePermissionRepository, CachedRoleRepository,
    CachedUserRoleRepository,
};
use warden_authz::infra::keys::CacheKeys;
use warden_authz::usecase::password::hash_password;
use warden_authz::usecase::seed::SeedUseCase;
use warden_core::context::RequestContext;
use warden_domain::id::{PermissionId, RoleId, RolePermissionId, UserId, UserRoleId};
use warden_domain::identity::{Identity, Scope};
use warden_domain::user::UserStatus;

pub const TEST_PASSWORD: &str = "correct horse battery staple";

// ── InMemoryStore ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct StoreState {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub user_roles: Vec<UserRole>,
    /// Every repository call that reached the store.
    pub calls: usize,
    /// Makes the next write fail after the row lock is taken.
    pub fail_next_write: bool,
}

impl StoreState {
    fn begin_write(&mut self) -> Result<(), AuthzError> {
        if std::mem::take(&mut self.fail_next_write) {
            return Err(AuthzError::Internal(anyhow::anyhow!(
                "injected store failure"
            )));
        }
        Ok(())
    }

    fn grants(&self, ids: &[PermissionId]) -> Result<Vec<GrantedPermission>, AuthzError> {
        ids.iter()
            .map(|id| {
                let permission = self
                    .permissions
                    .iter()
                    .find(|p| p.id == *id)
                    .cloned()
                    .ok_or(AuthzError::PermissionNotFound)?;
                Ok(GrantedPermission {
                    role_permission_id: RolePermissionId::generate(),
                    permission,
                })
            })
            .collect()
    }
}

/// One shared store backing every repository trait, so a test can observe
/// the effect of a write through any of them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    fn enter(&self, ctx: &RequestContext) -> Result<(), AuthzError> {
        ctx.check()?;
        self.state.lock().unwrap().calls += 1;
        Ok(())
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }

    pub fn fail_next_write(&self) {
        self.state.lock().unwrap().fail_next_write = true;
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    pub fn user_count(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    pub fn stored_role(&self, id: RoleId) -> Option<Role> {
        self.state
            .lock()
            .unwrap()
            .roles
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn seed_permission(&self, name: &str) -> Permission {
        let permission = Permission {
            id: PermissionId::generate(),
            name: name.to_owned(),
            label: name.to_uppercase(),
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .permissions
            .push(permission.clone());
        permission
    }

    pub fn seed_role(&self, name: &str, permissions: &[Permission]) -> Role {
        let role = Role {
            id: RoleId::generate(),
            name: name.to_owned(),
            permissions: permissions
                .iter()
                .map(|p| GrantedPermission {
                    role_permission_id: RolePermissionId::generate(),
                    permission: p.clone(),
                })
                .collect(),
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().roles.push(role.clone());
        role
    }

    pub fn seed_user(&self, email: &str) -> User {
        let user = User {
            id: UserId::generate(),
            name: "Test User".to_owned(),
            email: email.to_owned(),
            password: hash_password(TEST_PASSWORD).unwrap(),
            phone_number: "0800000000".to_owned(),
            photo: String::new(),
            dob: None,
            otp: None,
            status: UserStatus::Activated,
            forgot_password_token: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now() - Duration::minutes(5),
            updated_at: Utc::now() - Duration::minutes(5),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn bind(&self, user_id: UserId, role_id: RoleId) -> UserRole {
        let user_role = UserRole {
            id: UserRoleId::generate(),
            user_id,
            role_id,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .user_roles
            .push(user_role.clone());
        user_role
    }
}

impl InMemoryStore {
    /// Users with (`admins`) or without a binding, filtered, ordered and paged.
    fn page_users(&self, query: &UserQuery, admins: bool) -> (Vec<User>, u64) {
        let state = self.state.lock().unwrap();
        let needle = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut matched: Vec<User> = state
            .users
            .iter()
            .filter(|u| state.user_roles.iter().any(|ur| ur.user_id == u.id) == admins)
            .filter(|u| {
                needle.as_ref().is_none_or(|n| {
                    [&u.name, &u.email, &u.phone_number]
                        .iter()
                        .any(|field| field.to_lowercase().contains(n.as_str()))
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            let by_column = match query.sort {
                UserSort::CreatedAt => a.created_at.cmp(&b.created_at),
                UserSort::Name => a.name.cmp(&b.name),
                UserSort::Email => a.email.cmp(&b.email),
            };
            let by_column = match query.order {
                SortOrder::Asc => by_column,
                SortOrder::Desc => by_column.reverse(),
            };
            by_column.then_with(|| a.id.0.cmp(&b.id.0))
        });
        let total = matched.len() as u64;
        let page = query.page.clamped();
        let users = matched
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect();
        (users, total)
    }
}

impl UserRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: UserId,
    ) -> Result<Option<User>, AuthzError> {
        self.enter(ctx)?;
        Ok(self.user(id))
    }

    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<User>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.forgot_password_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_admin_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.email == email && state.user_roles.iter().any(|ur| ur.user_id == u.id))
            .cloned())
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        self.enter(ctx)?;
        Ok(self.page_users(query, false))
    }

    async fn list_admins(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        self.enter(ctx)?;
        Ok(self.page_users(query, true))
    }

    async fn create(&self, ctx: &RequestContext, user: &User) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        state.users.push(user.clone());
        Ok(())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user: &mut User,
        patch: &UserPatch,
    ) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let id = user.id;
        let actor = ctx.actor();
        run_locked_update(user, |now| async move {
            let mut state = self.state.lock().unwrap();
            state.begin_write()?;
            let row = state
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(AuthzError::UserNotFound)?;
            patch.narrow(row).apply_to(row);
            row.updated_at = now;
            if actor.is_some() {
                row.updated_by = actor;
            }
            Ok(row.clone())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<bool, AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        let deleted = state.users.len() < before;
        if deleted {
            // Foreign key cascade.
            state.user_roles.retain(|ur| ur.user_id != id);
        }
        Ok(deleted)
    }
}

impl RoleRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: RoleId,
    ) -> Result<Option<Role>, AuthzError> {
        self.enter(ctx)?;
        Ok(self.stored_role(id))
    }

    async fn list(&self, ctx: &RequestContext, query: &RoleQuery) -> Result<Vec<Role>, AuthzError> {
        self.enter(ctx)?;
        let page = query.page.clamped();
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .filter(|r| query.name.as_ref().is_none_or(|n| r.name.contains(n.as_str())))
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, ctx: &RequestContext, role: &Role) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        state.roles.push(role.clone());
        Ok(())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        role: &mut Role,
        patch: &RolePatch,
    ) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let id = role.id;
        let actor = ctx.actor();
        run_locked_update(role, |now| async move {
            let mut state = self.state.lock().unwrap();
            state.begin_write()?;
            let changes = {
                let row = state
                    .roles
                    .iter()
                    .find(|r| r.id == id)
                    .ok_or(AuthzError::RoleNotFound)?;
                patch.narrow(row)
            };
            let grants = match &changes.permission_ids {
                Some(ids) => Some(state.grants(ids)?),
                None => None,
            };
            let row = state
                .roles
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(AuthzError::RoleNotFound)?;
            changes.apply_to(row);
            if let Some(grants) = grants {
                row.permissions = grants;
            }
            row.updated_at = now;
            if actor.is_some() {
                row.updated_by = actor;
            }
            Ok(row.clone())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: RoleId) -> Result<bool, AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        let before = state.roles.len();
        state.roles.retain(|r| r.id != id);
        Ok(state.roles.len() < before)
    }
}

impl PermissionRepository for InMemoryStore {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: PermissionId,
    ) -> Result<Option<Permission>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state.permissions.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Permission>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state.permissions.iter().find(|p| p.name == name).cloned())
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &PermissionQuery,
    ) -> Result<Vec<Permission>, AuthzError> {
        self.enter(ctx)?;
        let page = query.page.clamped();
        let state = self.state.lock().unwrap();
        Ok(state
            .permissions
            .iter()
            .filter(|p| query.name.as_ref().is_none_or(|n| p.name.contains(n.as_str())))
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        permission: &Permission,
    ) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        state.permissions.push(permission.clone());
        Ok(())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        permission: &mut Permission,
        patch: &PermissionPatch,
    ) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let id = permission.id;
        let actor = ctx.actor();
        run_locked_update(permission, |now| async move {
            let mut state = self.state.lock().unwrap();
            state.begin_write()?;
            let row = state
                .permissions
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(AuthzError::PermissionNotFound)?;
            patch.narrow(row).apply_to(row);
            row.updated_at = now;
            if actor.is_some() {
                row.updated_by = actor;
            }
            let committed = row.clone();
            // Roles are read through a join, so they see the new row.
            for role in state.roles.iter_mut() {
                for granted in role.permissions.iter_mut() {
                    if granted.permission.id == id {
                        granted.permission = committed.clone();
                    }
                }
            }
            Ok(committed)
        })
        .await
    }
}

impl RolePermissionRepository for InMemoryStore {
    async fn find_by_pair(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<Option<RolePermission>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .and_then(|role| {
                role.permissions
                    .iter()
                    .find(|g| g.permission.id == permission_id)
                    .map(|g| RolePermission {
                        id: g.role_permission_id,
                        role_id,
                        permission_id,
                        created_at: role.updated_at,
                    })
            }))
    }
}

impl UserRoleRepository for InMemoryStore {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Option<UserRole>, AuthzError> {
        self.enter(ctx)?;
        let state = self.state.lock().unwrap();
        Ok(state
            .user_roles
            .iter()
            .find(|ur| ur.user_id == user_id)
            .cloned())
    }

    async fn create(&self, ctx: &RequestContext, user_role: &UserRole) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        if state.user_roles.iter().any(|ur| ur.user_id == user_role.user_id) {
            return Err(AuthzError::Internal(anyhow::anyhow!(
                "duplicate key value violates unique constraint"
            )));
        }
        state.user_roles.push(user_role.clone());
        Ok(())
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user_role: &mut UserRole,
        patch: &UserRolePatch,
    ) -> Result<(), AuthzError> {
        self.enter(ctx)?;
        let id = user_role.id;
        let actor = ctx.actor();
        run_locked_update(user_role, |now| async move {
            let mut state = self.state.lock().unwrap();
            state.begin_write()?;
            let row = state
                .user_roles
                .iter_mut()
                .find(|ur| ur.id == id)
                .ok_or(AuthzError::UserRoleNotFound)?;
            patch.narrow(row).apply_to(row);
            row.updated_at = now;
            if actor.is_some() {
                row.updated_by = actor;
            }
            Ok(row.clone())
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthzError> {
        self.enter(ctx)?;
        let mut state = self.state.lock().unwrap();
        state.begin_write()?;
        let before = state.user_roles.len();
        state.user_roles.retain(|ur| ur.user_id != user_id);
        Ok(state.user_roles.len() < before)
    }

    async fn forget(&self, _ctx: &RequestContext, _user_id: UserId) -> Result<(), AuthzError> {
        Ok(())
    }
}

// ── MemoryCache ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CacheState {
    pub entries: HashMap<String, Vec<u8>>,
    pub fail_reads: bool,
    pub fail_removes: bool,
    /// Patterns passed to `bulk_remove`, in call order.
    pub removed_patterns: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    pub state: Arc<Mutex<CacheState>>,
}

impl MemoryCache {
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn fail_removes(&self, fail: bool) {
        self.state.lock().unwrap().fail_removes = fail;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().unwrap().entries.contains_key(key)
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .entries
            .insert(key.to_owned(), value.to_vec());
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// Drain and return the patterns removed since the last call.
    pub fn take_removed(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().unwrap().removed_patterns)
    }
}

/// `*` matches any run of characters, everything else matches itself.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((head, rest)) => {
            let Some(tail) = key.strip_prefix(head) else {
                return false;
            };
            (0..=tail.len())
                .filter(|i| tail.is_char_boundary(*i))
                .any(|i| glob_match(rest, &tail[i..]))
        }
    }
}

impl AuthzCache for MemoryCache {
    async fn get(&self, ctx: &RequestContext, key: &str) -> Result<Option<Vec<u8>>, AuthzError> {
        ctx.check()?;
        let state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(AuthzError::Internal(anyhow::anyhow!("cache unavailable")));
        }
        Ok(state.entries.get(key).cloned())
    }

    async fn set(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &[u8],
        _ttl_secs: u64,
    ) -> Result<(), AuthzError> {
        ctx.check()?;
        self.state
            .lock()
            .unwrap()
            .entries
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    async fn incr(&self, ctx: &RequestContext, key: &str) -> Result<u64, AuthzError> {
        ctx.check()?;
        let mut state = self.state.lock().unwrap();
        let next = state
            .entries
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok()?.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        state
            .entries
            .insert(key.to_owned(), next.to_string().into_bytes());
        Ok(next)
    }

    async fn bulk_remove(&self, ctx: &RequestContext, pattern: &str) -> Result<u64, AuthzError> {
        ctx.check()?;
        let mut state = self.state.lock().unwrap();
        if state.fail_removes {
            return Err(AuthzError::Internal(anyhow::anyhow!("cache unavailable")));
        }
        state.removed_patterns.push(pattern.to_owned());
        let before = state.entries.len();
        state.entries.retain(|k, _| !glob_match(pattern, k));
        Ok((before - state.entries.len()) as u64)
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

/// In-memory store behind the same cache decorators production uses.
#[derive(Clone, Default)]
pub struct Harness {
    pub store: InMemoryStore,
    pub cache: MemoryCache,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> CacheKeys {
        CacheKeys::new("test")
    }

    pub fn layer(&self) -> CacheLayer<MemoryCache> {
        CacheLayer {
            cache: self.cache.clone(),
            keys: self.keys(),
            ttl_secs: 60,
        }
    }

    pub fn users(&self) -> InMemoryStore {
        self.store.clone()
    }

    pub fn roles(&self) -> CachedRoleRepository<InMemoryStore, MemoryCache> {
        CachedRoleRepository {
            inner: self.store.clone(),
            layer: self.layer(),
        }
    }

    pub fn permissions(&self) -> CachedPermissionRepository<InMemoryStore, MemoryCache> {
        CachedPermissionRepository {
            inner: self.store.clone(),
            layer: self.layer(),
        }
    }

    pub fn role_permissions(&self) -> CachedRolePermissionRepository<InMemoryStore, MemoryCache> {
        CachedRolePermissionRepository {
            inner: self.store.clone(),
            layer: self.layer(),
        }
    }

    pub fn user_roles(&self) -> CachedUserRoleRepository<InMemoryStore, MemoryCache> {
        CachedUserRoleRepository {
            inner: self.store.clone(),
            layer: self.layer(),
        }
    }

    pub fn seeder(
        &self,
    ) -> SeedUseCase<
        InMemoryStore,
        CachedRoleRepository<InMemoryStore, MemoryCache>,
        CachedPermissionRepository<InMemoryStore, MemoryCache>,
        CachedUserRoleRepository<InMemoryStore, MemoryCache>,
    > {
        SeedUseCase {
            users: self.users(),
            roles: self.roles(),
            permissions: self.permissions(),
            user_roles: self.user_roles(),
        }
    }
}

pub fn admin_ctx(user_id: UserId) -> RequestContext {
    RequestContext::background().with_identity(Identity {
        user_id,
        scope: Scope::Admin,
    })
}
