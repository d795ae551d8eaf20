use chrono::Utc;
use tracing::info;
use warden_core::context::RequestContext;
use warden_domain::id::{PermissionId, RoleId, RolePermissionId};

use crate::domain::change::RolePatch;
use crate::domain::repository::{PermissionRepository, RoleRepository};
use crate::domain::types::{GrantedPermission, Role, RoleQuery};
use crate::error::AuthzError;

/// Look up each permission, in order, dropping repeated ids.
async fn grants_for<P: PermissionRepository>(
    permissions: &P,
    ctx: &RequestContext,
    ids: &[PermissionId],
) -> Result<Vec<GrantedPermission>, AuthzError> {
    let mut granted: Vec<GrantedPermission> = Vec::with_capacity(ids.len());
    for &id in ids {
        if granted.iter().any(|g| g.permission.id == id) {
            continue;
        }
        let permission = permissions
            .find_by_id(ctx, id)
            .await?
            .ok_or(AuthzError::PermissionNotFound)?;
        granted.push(GrantedPermission {
            role_permission_id: RolePermissionId::generate(),
            permission,
        });
    }
    Ok(granted)
}

pub struct CreateRoleInput {
    pub name: String,
    pub permission_ids: Vec<PermissionId>,
}

pub struct CreateRoleUseCase<R, P>
where
    R: RoleRepository,
    P: PermissionRepository,
{
    pub roles: R,
    pub permissions: P,
}

impl<R, P> CreateRoleUseCase<R, P>
where
    R: RoleRepository,
    P: PermissionRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreateRoleInput,
    ) -> Result<Role, AuthzError> {
        ctx.check()?;
        let permissions = grants_for(&self.permissions, ctx, &input.permission_ids).await?;
        let now = Utc::now();
        let role = Role {
            id: RoleId::generate(),
            name: input.name,
            permissions,
            created_by: ctx.actor(),
            updated_by: ctx.actor(),
            created_at: now,
            updated_at: now,
        };
        self.roles.create(ctx, &role).await?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }
}

pub struct UpdateRoleInput {
    pub role_id: RoleId,
    pub name: Option<String>,
    /// Replaces the whole permission set, in this order.
    pub permission_ids: Option<Vec<PermissionId>>,
}

pub struct UpdateRoleUseCase<R, P>
where
    R: RoleRepository,
    P: PermissionRepository,
{
    pub roles: R,
    pub permissions: P,
}

impl<R, P> UpdateRoleUseCase<R, P>
where
    R: RoleRepository,
    P: PermissionRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: UpdateRoleInput,
    ) -> Result<Role, AuthzError> {
        ctx.check()?;
        let mut role = self
            .roles
            .find_by_id(ctx, input.role_id)
            .await?
            .ok_or(AuthzError::RoleNotFound)?;

        let permission_ids = match &input.permission_ids {
            Some(ids) => {
                let granted = grants_for(&self.permissions, ctx, ids).await?;
                Some(granted.iter().map(|g| g.permission.id).collect())
            }
            None => None,
        };
        let patch = RolePatch {
            name: input.name,
            permission_ids,
        };
        self.roles.update(ctx, &mut role, &patch).await?;
        info!(role_id = %role.id, "role updated");
        Ok(role)
    }
}

pub struct DeleteRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> DeleteRoleUseCase<R> {
    pub async fn execute(&self, ctx: &RequestContext, role_id: RoleId) -> Result<(), AuthzError> {
        ctx.check()?;
        if !self.roles.delete(ctx, role_id).await? {
            return Err(AuthzError::RoleNotFound);
        }
        info!(role_id = %role_id, "role deleted");
        Ok(())
    }
}

pub struct FindRoleUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> FindRoleUseCase<R> {
    pub async fn execute(&self, ctx: &RequestContext, role_id: RoleId) -> Result<Role, AuthzError> {
        ctx.check()?;
        self.roles
            .find_by_id(ctx, role_id)
            .await?
            .ok_or(AuthzError::RoleNotFound)
    }
}

pub struct ListRolesUseCase<R: RoleRepository> {
    pub roles: R,
}

impl<R: RoleRepository> ListRolesUseCase<R> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        query: RoleQuery,
    ) -> Result<Vec<Role>, AuthzError> {
        ctx.check()?;
        self.roles.list(ctx, &query).await
    }
}
