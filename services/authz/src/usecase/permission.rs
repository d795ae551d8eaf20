use chrono::Utc;
use tracing::info;
use warden_core::context::RequestContext;
use warden_domain::id::PermissionId;

use crate::domain::change::PermissionPatch;
use crate::domain::repository::PermissionRepository;
use crate::domain::types::{Permission, PermissionQuery};
use crate::error::AuthzError;

pub struct CreatePermissionInput {
    pub name: String,
    pub label: String,
}

pub struct CreatePermissionUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> CreatePermissionUseCase<P> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreatePermissionInput,
    ) -> Result<Permission, AuthzError> {
        ctx.check()?;
        let now = Utc::now();
        let permission = Permission {
            id: PermissionId::generate(),
            name: input.name,
            label: input.label,
            created_by: ctx.actor(),
            updated_by: ctx.actor(),
            created_at: now,
            updated_at: now,
        };
        self.permissions.create(ctx, &permission).await?;
        info!(permission_id = %permission.id, name = %permission.name, "permission created");
        Ok(permission)
    }
}

pub struct UpdatePermissionInput {
    pub permission_id: PermissionId,
    pub name: Option<String>,
    pub label: Option<String>,
}

pub struct UpdatePermissionUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> UpdatePermissionUseCase<P> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: UpdatePermissionInput,
    ) -> Result<Permission, AuthzError> {
        ctx.check()?;
        let mut permission = self
            .permissions
            .find_by_id(ctx, input.permission_id)
            .await?
            .ok_or(AuthzError::PermissionNotFound)?;
        let patch = PermissionPatch {
            name: input.name,
            label: input.label,
        };
        self.permissions.update(ctx, &mut permission, &patch).await?;
        info!(permission_id = %permission.id, "permission updated");
        Ok(permission)
    }
}

pub struct ListPermissionsUseCase<P: PermissionRepository> {
    pub permissions: P,
}

impl<P: PermissionRepository> ListPermissionsUseCase<P> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        query: PermissionQuery,
    ) -> Result<Vec<Permission>, AuthzError> {
        ctx.check()?;
        self.permissions.list(ctx, &query).await
    }
}
