use tracing::debug;
use warden_core::context::RequestContext;

use crate::domain::repository::{PermissionRepository, RolePermissionRepository, UserRoleRepository};
use crate::domain::types::RolePermission;
use crate::error::AuthzError;

/// Named-permission check for the caller bound to the context.
///
/// The gates establish who the caller is; this decides whether that caller's
/// role holds `permission`. All three lookups are cache-then-store.
pub struct RequirePermissionUseCase<UR, P, RP>
where
    UR: UserRoleRepository,
    P: PermissionRepository,
    RP: RolePermissionRepository,
{
    pub user_roles: UR,
    pub permissions: P,
    pub role_permissions: RP,
}

impl<UR, P, RP> RequirePermissionUseCase<UR, P, RP>
where
    UR: UserRoleRepository,
    P: PermissionRepository,
    RP: RolePermissionRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        permission: &str,
    ) -> Result<RolePermission, AuthzError> {
        ctx.check()?;
        let identity = ctx.identity().ok_or(AuthzError::Unauthorized)?;
        let user_role = self
            .user_roles
            .find_by_user_id(ctx, identity.user_id)
            .await?
            .ok_or(AuthzError::Forbidden)?;
        let permission_row = self
            .permissions
            .find_by_name(ctx, permission)
            .await?
            .ok_or(AuthzError::PermissionNotFound)?;
        let grant = self
            .role_permissions
            .find_by_pair(ctx, user_role.role_id, permission_row.id)
            .await?;
        match grant {
            Some(grant) => Ok(grant),
            None => {
                debug!(
                    user_id = %identity.user_id,
                    role_id = %user_role.role_id,
                    permission,
                    "permission denied"
                );
                Err(AuthzError::Forbidden)
            }
        }
    }
}
