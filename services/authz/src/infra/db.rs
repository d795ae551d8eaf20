use std::collections::HashMap;

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr as _;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, IntoActiveModel as _, PaginatorTrait as _, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;
use warden_core::context::RequestContext;
use warden_domain::id::{PermissionId, RoleId, RolePermissionId, UserId};
use warden_domain::user::UserStatus;

use warden_authz_schema::{permissions, role_permissions, roles, user_roles, users};

use crate::domain::change::{
    Patch as _, PermissionPatch, RolePatch, UserPatch, UserRolePatch, run_locked_update,
};
use crate::domain::repository::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRepository,
    UserRoleRepository,
};
use crate::domain::types::{
    GrantedPermission, Permission, PermissionQuery, Role, RolePermission, RoleQuery, SortOrder,
    User, UserQuery, UserRole, UserSort,
};
use crate::error::AuthzError;

fn raw(id: Option<UserId>) -> Option<Uuid> {
    id.map(|u| u.0)
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: UserId,
    ) -> Result<Option<User>, AuthzError> {
        ctx.guard(async {
            let model = users::Entity::find_by_id(id.0)
                .one(&self.db)
                .await
                .context("find user by id")?;
            model.map(user_from_model).transpose()
        })
        .await
    }

    async fn find_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError> {
        ctx.guard(async {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&self.db)
                .await
                .context("find user by email")?;
            model.map(user_from_model).transpose()
        })
        .await
    }

    async fn find_by_reset_token(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<Option<User>, AuthzError> {
        ctx.guard(async {
            let model = users::Entity::find()
                .filter(users::Column::ForgotPasswordToken.eq(token))
                .one(&self.db)
                .await
                .context("find user by reset token")?;
            model.map(user_from_model).transpose()
        })
        .await
    }

    async fn find_admin_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<Option<User>, AuthzError> {
        ctx.guard(async {
            let model = users::Entity::find()
                .inner_join(user_roles::Entity)
                .filter(users::Column::Email.eq(email))
                .one(&self.db)
                .await
                .context("find admin by email")?;
            model.map(user_from_model).transpose()
        })
        .await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        ctx.guard(async {
            let select = users::Entity::find()
                .left_join(user_roles::Entity)
                .filter(user_roles::Column::UserId.is_null());
            page_users(&self.db, select, query, "list users").await
        })
        .await
    }

    async fn list_admins(
        &self,
        ctx: &RequestContext,
        query: &UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        ctx.guard(async {
            let select = users::Entity::find().inner_join(user_roles::Entity);
            page_users(&self.db, select, query, "list admins").await
        })
        .await
    }

    async fn create(&self, ctx: &RequestContext, user: &User) -> Result<(), AuthzError> {
        ctx.guard(async {
            users::ActiveModel {
                id: Set(user.id.0),
                name: Set(user.name.clone()),
                email: Set(user.email.clone()),
                password: Set(user.password.clone()),
                phone_number: Set(user.phone_number.clone()),
                photo: Set(user.photo.clone()),
                dob: Set(user.dob),
                otp: Set(user.otp.clone()),
                status: Set(user.status.as_str().to_owned()),
                forgot_password_token: Set(user.forgot_password_token.clone()),
                created_by: Set(raw(user.created_by)),
                updated_by: Set(raw(user.updated_by)),
                created_at: Set(user.created_at),
                updated_at: Set(user.updated_at),
            }
            .insert(&self.db)
            .await
            .context("create user")?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user: &mut User,
        patch: &UserPatch,
    ) -> Result<(), AuthzError> {
        let id = user.id;
        let actor = ctx.actor();
        run_locked_update(user, |now| {
            ctx.guard(async move {
                let txn = self.db.begin().await.context("begin user update")?;
                let locked = users::Entity::find_by_id(id.0)
                    .lock_exclusive()
                    .one(&txn)
                    .await
                    .context("lock user")?
                    .ok_or(AuthzError::UserNotFound)?;
                let changes = patch.narrow(&user_from_model(locked.clone())?);

                let mut am = locked.into_active_model();
                write_user_changes(&mut am, &changes);
                if actor.is_some() {
                    am.updated_by = Set(raw(actor));
                }
                am.updated_at = Set(now);
                let model = am.update(&txn).await.context("update user")?;
                txn.commit().await.context("commit user update")?;
                user_from_model(model)
            })
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: UserId) -> Result<bool, AuthzError> {
        ctx.guard(async {
            let result = users::Entity::delete_by_id(id.0)
                .exec(&self.db)
                .await
                .context("delete user")?;
            Ok(result.rows_affected > 0)
        })
        .await
    }
}

/// Apply search, ordering and paging, and count the filtered rows.
async fn page_users(
    db: &DatabaseConnection,
    select: Select<users::Entity>,
    query: &UserQuery,
    what: &str,
) -> Result<(Vec<User>, u64), AuthzError> {
    let select = match query.search.as_deref().filter(|s| !s.is_empty()) {
        Some(search) => {
            let pattern = format!("%{search}%");
            select.filter(
                Condition::any()
                    .add(Expr::col((users::Entity, users::Column::Name)).ilike(pattern.as_str()))
                    .add(Expr::col((users::Entity, users::Column::Email)).ilike(pattern.as_str()))
                    .add(
                        Expr::col((users::Entity, users::Column::PhoneNumber))
                            .ilike(pattern.as_str()),
                    ),
            )
        }
        None => select,
    };
    let total = select
        .clone()
        .count(db)
        .await
        .with_context(|| format!("count for {what}"))?;

    let column = match query.sort {
        UserSort::CreatedAt => users::Column::CreatedAt,
        UserSort::Name => users::Column::Name,
        UserSort::Email => users::Column::Email,
    };
    let order = match query.order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    };
    let page = query.page.clamped();
    let models = select
        .order_by(column, order)
        .order_by_asc(users::Column::Id)
        .offset(page.offset())
        .limit(u64::from(page.per_page))
        .all(db)
        .await
        .with_context(|| what.to_owned())?;
    let users = models
        .into_iter()
        .map(user_from_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((users, total))
}

fn write_user_changes(am: &mut users::ActiveModel, changes: &UserPatch) {
    if let Some(v) = &changes.name {
        am.name = Set(v.clone());
    }
    if let Some(v) = &changes.email {
        am.email = Set(v.clone());
    }
    if let Some(v) = &changes.password {
        am.password = Set(v.clone());
    }
    if let Some(v) = &changes.phone_number {
        am.phone_number = Set(v.clone());
    }
    if let Some(v) = &changes.photo {
        am.photo = Set(v.clone());
    }
    if let Some(v) = changes.dob {
        am.dob = Set(v);
    }
    if let Some(v) = &changes.otp {
        am.otp = Set(v.clone());
    }
    if let Some(v) = changes.status {
        am.status = Set(v.as_str().to_owned());
    }
    if let Some(v) = &changes.forgot_password_token {
        am.forgot_password_token = Set(v.clone());
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthzError> {
    let status = model
        .status
        .parse::<UserStatus>()
        .with_context(|| format!("user {} has unreadable status", model.id))?;
    Ok(User {
        id: model.id.into(),
        name: model.name,
        email: model.email,
        password: model.password,
        phone_number: model.phone_number,
        photo: model.photo,
        dob: model.dob,
        otp: model.otp,
        status,
        forgot_password_token: model.forgot_password_token,
        created_by: model.created_by.map(Into::into),
        updated_by: model.updated_by.map(Into::into),
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: RoleId,
    ) -> Result<Option<Role>, AuthzError> {
        ctx.guard(load_role(&self.db, id)).await
    }

    async fn list(&self, ctx: &RequestContext, query: &RoleQuery) -> Result<Vec<Role>, AuthzError> {
        ctx.guard(async {
            let page = query.page.clamped();
            let mut select = roles::Entity::find().filter(roles::Column::DeletedAt.is_null());
            if let Some(name) = &query.name {
                select = select.filter(roles::Column::Name.contains(name));
            }
            let models = select
                .order_by_asc(roles::Column::CreatedAt)
                .order_by_asc(roles::Column::Id)
                .offset(page.offset())
                .limit(u64::from(page.per_page))
                .all(&self.db)
                .await
                .context("list roles")?;

            let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
            let mut grants = load_grants(&self.db, &ids).await?;
            Ok(models
                .into_iter()
                .map(|m| {
                    let granted = grants.remove(&m.id).unwrap_or_default();
                    role_from_model(m, granted)
                })
                .collect())
        })
        .await
    }

    async fn create(&self, ctx: &RequestContext, role: &Role) -> Result<(), AuthzError> {
        ctx.guard(async {
            let txn = self.db.begin().await.context("begin role create")?;
            roles::ActiveModel {
                id: Set(role.id.0),
                name: Set(role.name.clone()),
                created_by: Set(raw(role.created_by)),
                updated_by: Set(raw(role.updated_by)),
                deleted_by: Set(None),
                created_at: Set(role.created_at),
                updated_at: Set(role.updated_at),
                deleted_at: Set(None),
            }
            .insert(&txn)
            .await
            .context("create role")?;

            let grants = role
                .permissions
                .iter()
                .map(|g| (g.role_permission_id, g.permission.id));
            insert_grants(&txn, role.id, grants, role.created_by, role.created_at).await?;
            txn.commit().await.context("commit role create")?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        role: &mut Role,
        patch: &RolePatch,
    ) -> Result<(), AuthzError> {
        let id = role.id;
        let actor = ctx.actor();
        run_locked_update(role, |now| {
            ctx.guard(async move {
                let txn = self.db.begin().await.context("begin role update")?;
                let locked = roles::Entity::find_by_id(id.0)
                    .filter(roles::Column::DeletedAt.is_null())
                    .lock_exclusive()
                    .one(&txn)
                    .await
                    .context("lock role")?
                    .ok_or(AuthzError::RoleNotFound)?;
                // Narrowing only compares scalar columns, so the grants are not loaded here.
                let changes = patch.narrow(&role_from_model(locked.clone(), Vec::new()));

                let mut am = locked.into_active_model();
                if let Some(name) = &changes.name {
                    am.name = Set(name.clone());
                }
                if actor.is_some() {
                    am.updated_by = Set(raw(actor));
                }
                am.updated_at = Set(now);
                am.update(&txn).await.context("update role")?;

                if let Some(permission_ids) = &changes.permission_ids {
                    // Hard delete, including rows soft-deleted earlier.
                    role_permissions::Entity::delete_many()
                        .filter(role_permissions::Column::RoleId.eq(id.0))
                        .exec(&txn)
                        .await
                        .context("clear role permissions")?;
                    let grants = permission_ids
                        .iter()
                        .map(|p| (RolePermissionId::generate(), *p));
                    insert_grants(&txn, id, grants, actor, now).await?;
                }

                let committed = load_role(&txn, id)
                    .await?
                    .ok_or(AuthzError::RoleNotFound)?;
                txn.commit().await.context("commit role update")?;
                Ok(committed)
            })
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, id: RoleId) -> Result<bool, AuthzError> {
        ctx.guard(async {
            let now = Utc::now();
            let actor = raw(ctx.actor());
            let txn = self.db.begin().await.context("begin role delete")?;
            let result = roles::Entity::update_many()
                .col_expr(roles::Column::DeletedAt, Expr::value(now))
                .col_expr(roles::Column::DeletedBy, Expr::value(actor))
                .filter(roles::Column::Id.eq(id.0))
                .filter(roles::Column::DeletedAt.is_null())
                .exec(&txn)
                .await
                .context("soft-delete role")?;
            if result.rows_affected == 0 {
                return Ok(false);
            }
            role_permissions::Entity::update_many()
                .col_expr(role_permissions::Column::DeletedAt, Expr::value(now))
                .col_expr(role_permissions::Column::DeletedBy, Expr::value(actor))
                .filter(role_permissions::Column::RoleId.eq(id.0))
                .filter(role_permissions::Column::DeletedAt.is_null())
                .exec(&txn)
                .await
                .context("soft-delete role permissions")?;
            txn.commit().await.context("commit role delete")?;
            Ok(true)
        })
        .await
    }
}

async fn load_role<C: ConnectionTrait>(conn: &C, id: RoleId) -> Result<Option<Role>, AuthzError> {
    let Some(model) = roles::Entity::find_by_id(id.0)
        .filter(roles::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .context("find role by id")?
    else {
        return Ok(None);
    };
    let mut grants = load_grants(conn, &[model.id]).await?;
    let granted = grants.remove(&model.id).unwrap_or_default();
    Ok(Some(role_from_model(model, granted)))
}

/// Live grants of each role, in insertion order.
///
/// An association whose permission row is missing is an integrity failure,
/// never silently dropped from the role.
async fn load_grants<C: ConnectionTrait>(
    conn: &C,
    role_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<GrantedPermission>>, AuthzError> {
    let mut grants: HashMap<Uuid, Vec<GrantedPermission>> = HashMap::new();
    if role_ids.is_empty() {
        return Ok(grants);
    }
    let rows = role_permissions::Entity::find()
        .filter(role_permissions::Column::RoleId.is_in(role_ids.iter().copied()))
        .filter(role_permissions::Column::DeletedAt.is_null())
        .order_by_asc(role_permissions::Column::Id)
        .find_also_related(permissions::Entity)
        .all(conn)
        .await
        .context("load role permissions")?;
    for (association, permission) in rows {
        let permission = permission.ok_or_else(|| {
            anyhow!(
                "role permission {} references missing permission {}",
                association.id,
                association.permission_id
            )
        })?;
        grants
            .entry(association.role_id)
            .or_default()
            .push(GrantedPermission {
                role_permission_id: association.id.into(),
                permission: permission_from_model(permission),
            });
    }
    Ok(grants)
}

async fn insert_grants<C, I>(
    conn: &C,
    role_id: RoleId,
    grants: I,
    actor: Option<UserId>,
    at: DateTime<Utc>,
) -> Result<(), AuthzError>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = (RolePermissionId, PermissionId)>,
{
    let models: Vec<role_permissions::ActiveModel> = grants
        .into_iter()
        .map(|(id, permission_id)| role_permissions::ActiveModel {
            id: Set(id.0),
            role_id: Set(role_id.0),
            permission_id: Set(permission_id.0),
            created_by: Set(raw(actor)),
            deleted_by: Set(None),
            created_at: Set(at),
            deleted_at: Set(None),
        })
        .collect();
    if models.is_empty() {
        return Ok(());
    }
    role_permissions::Entity::insert_many(models)
        .exec(conn)
        .await
        .context("insert role permissions")?;
    Ok(())
}

fn role_from_model(model: roles::Model, permissions: Vec<GrantedPermission>) -> Role {
    Role {
        id: model.id.into(),
        name: model.name,
        permissions,
        created_by: model.created_by.map(Into::into),
        updated_by: model.updated_by.map(Into::into),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Permission repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPermissionRepository {
    pub db: DatabaseConnection,
}

impl PermissionRepository for DbPermissionRepository {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: PermissionId,
    ) -> Result<Option<Permission>, AuthzError> {
        ctx.guard(async {
            let model = permissions::Entity::find_by_id(id.0)
                .one(&self.db)
                .await
                .context("find permission by id")?;
            Ok(model.map(permission_from_model))
        })
        .await
    }

    async fn find_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Permission>, AuthzError> {
        ctx.guard(async {
            let model = permissions::Entity::find()
                .filter(permissions::Column::Name.eq(name))
                .one(&self.db)
                .await
                .context("find permission by name")?;
            Ok(model.map(permission_from_model))
        })
        .await
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        query: &PermissionQuery,
    ) -> Result<Vec<Permission>, AuthzError> {
        ctx.guard(async {
            let page = query.page.clamped();
            let mut select = permissions::Entity::find();
            if let Some(name) = &query.name {
                select = select.filter(permissions::Column::Name.contains(name));
            }
            let models = select
                .order_by_asc(permissions::Column::Name)
                .offset(page.offset())
                .limit(u64::from(page.per_page))
                .all(&self.db)
                .await
                .context("list permissions")?;
            Ok(models.into_iter().map(permission_from_model).collect())
        })
        .await
    }

    async fn create(
        &self,
        ctx: &RequestContext,
        permission: &Permission,
    ) -> Result<(), AuthzError> {
        ctx.guard(async {
            permissions::ActiveModel {
                id: Set(permission.id.0),
                name: Set(permission.name.clone()),
                label: Set(permission.label.clone()),
                created_by: Set(raw(permission.created_by)),
                updated_by: Set(raw(permission.updated_by)),
                created_at: Set(permission.created_at),
                updated_at: Set(permission.updated_at),
            }
            .insert(&self.db)
            .await
            .context("create permission")?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        permission: &mut Permission,
        patch: &PermissionPatch,
    ) -> Result<(), AuthzError> {
        let id = permission.id;
        let actor = ctx.actor();
        run_locked_update(permission, |now| {
            ctx.guard(async move {
                let txn = self.db.begin().await.context("begin permission update")?;
                let locked = permissions::Entity::find_by_id(id.0)
                    .lock_exclusive()
                    .one(&txn)
                    .await
                    .context("lock permission")?
                    .ok_or(AuthzError::PermissionNotFound)?;
                let changes = patch.narrow(&permission_from_model(locked.clone()));

                let mut am = locked.into_active_model();
                if let Some(name) = &changes.name {
                    am.name = Set(name.clone());
                }
                if let Some(label) = &changes.label {
                    am.label = Set(label.clone());
                }
                if actor.is_some() {
                    am.updated_by = Set(raw(actor));
                }
                am.updated_at = Set(now);
                let model = am.update(&txn).await.context("update permission")?;
                txn.commit().await.context("commit permission update")?;
                Ok(permission_from_model(model))
            })
        })
        .await
    }
}

fn permission_from_model(model: permissions::Model) -> Permission {
    Permission {
        id: model.id.into(),
        name: model.name,
        label: model.label,
        created_by: model.created_by.map(Into::into),
        updated_by: model.updated_by.map(Into::into),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── RolePermission repository ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRolePermissionRepository {
    pub db: DatabaseConnection,
}

impl RolePermissionRepository for DbRolePermissionRepository {
    async fn find_by_pair(
        &self,
        ctx: &RequestContext,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> Result<Option<RolePermission>, AuthzError> {
        ctx.guard(async {
            let model = role_permissions::Entity::find()
                .filter(role_permissions::Column::RoleId.eq(role_id.0))
                .filter(role_permissions::Column::PermissionId.eq(permission_id.0))
                .filter(role_permissions::Column::DeletedAt.is_null())
                .one(&self.db)
                .await
                .context("find role permission by pair")?;
            Ok(model.map(|m| RolePermission {
                id: m.id.into(),
                role_id: m.role_id.into(),
                permission_id: m.permission_id.into(),
                created_at: m.created_at,
            }))
        })
        .await
    }
}

// ── UserRole repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRoleRepository {
    pub db: DatabaseConnection,
}

impl UserRoleRepository for DbUserRoleRepository {
    async fn find_by_user_id(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<Option<UserRole>, AuthzError> {
        ctx.guard(async {
            let model = user_roles::Entity::find()
                .filter(user_roles::Column::UserId.eq(user_id.0))
                .one(&self.db)
                .await
                .context("find user role by user id")?;
            Ok(model.map(user_role_from_model))
        })
        .await
    }

    async fn create(&self, ctx: &RequestContext, user_role: &UserRole) -> Result<(), AuthzError> {
        ctx.guard(async {
            user_roles::ActiveModel {
                id: Set(user_role.id.0),
                user_id: Set(user_role.user_id.0),
                role_id: Set(user_role.role_id.0),
                created_by: Set(raw(user_role.created_by)),
                updated_by: Set(raw(user_role.updated_by)),
                created_at: Set(user_role.created_at),
                updated_at: Set(user_role.updated_at),
            }
            .insert(&self.db)
            .await
            .context("create user role")?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        user_role: &mut UserRole,
        patch: &UserRolePatch,
    ) -> Result<(), AuthzError> {
        let id = user_role.id;
        let actor = ctx.actor();
        run_locked_update(user_role, |now| {
            ctx.guard(async move {
                let txn = self.db.begin().await.context("begin user role update")?;
                let locked = user_roles::Entity::find_by_id(id.0)
                    .lock_exclusive()
                    .one(&txn)
                    .await
                    .context("lock user role")?
                    .ok_or(AuthzError::UserRoleNotFound)?;
                let changes = patch.narrow(&user_role_from_model(locked.clone()));

                let mut am = locked.into_active_model();
                if let Some(role_id) = changes.role_id {
                    am.role_id = Set(role_id.0);
                }
                if actor.is_some() {
                    am.updated_by = Set(raw(actor));
                }
                am.updated_at = Set(now);
                let model = am.update(&txn).await.context("update user role")?;
                txn.commit().await.context("commit user role update")?;
                Ok(user_role_from_model(model))
            })
        })
        .await
    }

    async fn delete(&self, ctx: &RequestContext, user_id: UserId) -> Result<bool, AuthzError> {
        ctx.guard(async {
            let result = user_roles::Entity::delete_many()
                .filter(user_roles::Column::UserId.eq(user_id.0))
                .exec(&self.db)
                .await
                .context("delete user role")?;
            Ok(result.rows_affected > 0)
        })
        .await
    }

    /// The foreign key cascade already removed the row.
    async fn forget(&self, _ctx: &RequestContext, _user_id: UserId) -> Result<(), AuthzError> {
        Ok(())
    }
}

fn user_role_from_model(model: user_roles::Model) -> UserRole {
    UserRole {
        id: model.id.into(),
        user_id: model.user_id.into(),
        role_id: model.role_id.into(),
        created_by: model.created_by.map(Into::into),
        updated_by: model.updated_by.map(Into::into),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
