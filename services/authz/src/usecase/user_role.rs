use chrono::Utc;
use tracing::info;
use warden_core::context::RequestContext;
use warden_domain::id::{RoleId, UserId, UserRoleId};

use crate::domain::change::UserRolePatch;
use crate::domain::repository::{RoleRepository, UserRoleRepository};
use crate::domain::types::UserRole;
use crate::error::AuthzError;

/// Bind a user to a role: update the existing binding in place, or insert one.
pub(crate) async fn bind_role<UR, R>(
    user_roles: &UR,
    roles: &R,
    ctx: &RequestContext,
    user_id: UserId,
    role_id: RoleId,
) -> Result<UserRole, AuthzError>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    roles
        .find_by_id(ctx, role_id)
        .await?
        .ok_or(AuthzError::RoleNotFound)?;

    if let Some(mut existing) = user_roles.find_by_user_id(ctx, user_id).await? {
        let patch = UserRolePatch {
            role_id: Some(role_id),
        };
        user_roles.update(ctx, &mut existing, &patch).await?;
        info!(user_id = %user_id, role_id = %role_id, "user role updated");
        return Ok(existing);
    }

    let now = Utc::now();
    let user_role = UserRole {
        id: UserRoleId::generate(),
        user_id,
        role_id,
        created_by: ctx.actor(),
        updated_by: ctx.actor(),
        created_at: now,
        updated_at: now,
    };
    user_roles.create(ctx, &user_role).await?;
    info!(user_id = %user_id, role_id = %role_id, "user role created");
    Ok(user_role)
}

pub struct CreateOrUpdateUserRoleUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub user_roles: UR,
    pub roles: R,
}

impl<UR, R> CreateOrUpdateUserRoleUseCase<UR, R>
where
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<UserRole, AuthzError> {
        ctx.check()?;
        bind_role(&self.user_roles, &self.roles, ctx, user_id, role_id).await
    }
}

pub struct FindUserRoleUseCase<UR: UserRoleRepository> {
    pub user_roles: UR,
}

impl<UR: UserRoleRepository> FindUserRoleUseCase<UR> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<UserRole, AuthzError> {
        ctx.check()?;
        self.user_roles
            .find_by_user_id(ctx, user_id)
            .await?
            .ok_or(AuthzError::UserRoleNotFound)
    }
}

pub struct DeleteUserRoleUseCase<UR: UserRoleRepository> {
    pub user_roles: UR,
}

impl<UR: UserRoleRepository> DeleteUserRoleUseCase<UR> {
    pub async fn execute(&self, ctx: &RequestContext, user_id: UserId) -> Result<(), AuthzError> {
        ctx.check()?;
        if !self.user_roles.delete(ctx, user_id).await? {
            return Err(AuthzError::UserRoleNotFound);
        }
        info!(user_id = %user_id, "user role removed");
        Ok(())
    }
}
