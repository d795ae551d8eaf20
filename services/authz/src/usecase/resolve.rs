use warden_core::context::RequestContext;
use warden_domain::id::UserId;

use crate::domain::repository::{RoleRepository, UserRoleRepository};
use crate::domain::types::{Permission, Role};
use crate::error::AuthzError;

/// user → user-role → role, both lookups cache-then-store.
async fn resolve_role<UR, R>(
    user_roles: &UR,
    roles: &R,
    ctx: &RequestContext,
    user_id: UserId,
) -> Result<Role, AuthzError>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    ctx.check()?;
    let user_role = user_roles
        .find_by_user_id(ctx, user_id)
        .await?
        .ok_or(AuthzError::UserRoleNotFound)?;
    roles
        .find_by_id(ctx, user_role.role_id)
        .await?
        .ok_or(AuthzError::RoleNotFound)
}

pub struct ResolveRoleUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub user_roles: UR,
    pub roles: R,
}

impl<UR, R> ResolveRoleUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub async fn execute(&self, ctx: &RequestContext, user_id: UserId) -> Result<Role, AuthzError> {
        resolve_role(&self.user_roles, &self.roles, ctx, user_id).await
    }
}

/// Effective permissions of a user, in the order they were granted to its role.
pub struct ResolvePermissionsUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub user_roles: UR,
    pub roles: R,
}

impl<UR, R> ResolvePermissionsUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Vec<Permission>, AuthzError> {
        let role = resolve_role(&self.user_roles, &self.roles, ctx, user_id).await?;
        Ok(role
            .permissions
            .into_iter()
            .map(|granted| granted.permission)
            .collect())
    }
}
