//! First-run provisioning: the permission catalogue, a super-admin role
//! holding all of it, and one administrator bound to that role.
//!
//! Every step looks for what an earlier run left behind before creating
//! anything, so running it again only fills in what is missing.

use tracing::info;
use warden_core::context::RequestContext;
use warden_domain::pagination::PageRequest;

use crate::domain::repository::{
    PermissionRepository, RoleRepository, UserRepository, UserRoleRepository,
};
use crate::domain::types::{Role, RoleQuery, User};
use crate::error::AuthzError;
use crate::usecase::permission::{CreatePermissionInput, CreatePermissionUseCase};
use crate::usecase::role::{CreateRoleInput, CreateRoleUseCase};
use crate::usecase::user::{CreateAdminUseCase, CreateUserInput};

/// Permission catalogue: `(name, label)`.
pub const CATALOGUE: &[(&str, &str)] = &[
    ("role.read", "View roles"),
    ("role.create", "Create roles"),
    ("role.update", "Update roles"),
    ("role.delete", "Delete roles"),
    ("permission.read", "View permissions"),
    ("permission.create", "Create permissions"),
    ("permission.update", "Update permissions"),
    ("admin.read", "View administrators"),
    ("admin.create", "Create administrators"),
    ("admin.update", "Update administrators"),
    ("admin.delete", "Delete administrators"),
    ("user.read", "View users"),
    ("user.update", "Update users"),
];

pub const SUPER_ADMIN: &str = "Super Admin";

#[derive(Debug)]
pub struct SeedOutcome {
    pub role: Role,
    pub role_created: bool,
    /// `None` when an account with the admin email already existed.
    pub admin: Option<User>,
}

pub struct SeedUseCase<U, R, P, UR>
where
    U: UserRepository + Clone,
    R: RoleRepository + Clone,
    P: PermissionRepository + Clone,
    UR: UserRoleRepository + Clone,
{
    pub users: U,
    pub roles: R,
    pub permissions: P,
    pub user_roles: UR,
}

impl<U, R, P, UR> SeedUseCase<U, R, P, UR>
where
    U: UserRepository + Clone,
    R: RoleRepository + Clone,
    P: PermissionRepository + Clone,
    UR: UserRoleRepository + Clone,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        admin: CreateUserInput,
    ) -> Result<SeedOutcome, AuthzError> {
        ctx.check()?;
        let mut permission_ids = Vec::with_capacity(CATALOGUE.len());
        for (name, label) in CATALOGUE {
            let id = match self.permissions.find_by_name(ctx, name).await? {
                Some(existing) => existing.id,
                None => {
                    CreatePermissionUseCase {
                        permissions: self.permissions.clone(),
                    }
                    .execute(
                        ctx,
                        CreatePermissionInput {
                            name: (*name).to_owned(),
                            label: (*label).to_owned(),
                        },
                    )
                    .await?
                    .id
                }
            };
            permission_ids.push(id);
        }

        let (role, role_created) = match self.find_role_by_name(ctx, SUPER_ADMIN).await? {
            Some(existing) => {
                info!(role_id = %existing.id, "reusing existing {SUPER_ADMIN} role");
                (existing, false)
            }
            None => {
                let created = CreateRoleUseCase {
                    roles: self.roles.clone(),
                    permissions: self.permissions.clone(),
                }
                .execute(
                    ctx,
                    CreateRoleInput {
                        name: SUPER_ADMIN.to_owned(),
                        permission_ids,
                    },
                )
                .await?;
                (created, true)
            }
        };

        if self.users.find_by_email(ctx, &admin.email).await?.is_some() {
            info!(email = %admin.email, "admin already present");
            return Ok(SeedOutcome {
                role,
                role_created,
                admin: None,
            });
        }

        let (user, _) = CreateAdminUseCase {
            users: self.users.clone(),
            user_roles: self.user_roles.clone(),
            roles: self.roles.clone(),
        }
        .execute(ctx, admin, role.id)
        .await?;

        Ok(SeedOutcome {
            role,
            role_created,
            admin: Some(user),
        })
    }

    /// Role names are not unique in the store, so take the first exact match.
    async fn find_role_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Role>, AuthzError> {
        let query = RoleQuery {
            name: Some(name.to_owned()),
            page: PageRequest {
                per_page: 100,
                page: 1,
            },
        };
        let roles = self.roles.list(ctx, &query).await?;
        Ok(roles.into_iter().find(|r| r.name == name))
    }
}
