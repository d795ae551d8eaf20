use chrono::{NaiveDate, Utc};
use rand::RngExt;
use tracing::info;
use warden_core::context::RequestContext;
use warden_domain::id::{RoleId, UserId};
use warden_domain::user::UserStatus;

use crate::domain::change::UserPatch;
use crate::domain::repository::{RoleRepository, UserRepository, UserRoleRepository};
use crate::domain::types::{OTP_LEN, RESET_TOKEN_LEN, User, UserQuery, UserRole};
use crate::error::AuthzError;
use crate::usecase::password::{hash_password, verify_password};
use crate::usecase::user_role::bind_role;

const DIGITS: &[u8] = b"0123456789";
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn random_string(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

async fn load_user<U: UserRepository>(
    users: &U,
    ctx: &RequestContext,
    user_id: UserId,
) -> Result<User, AuthzError> {
    users
        .find_by_id(ctx, user_id)
        .await?
        .ok_or(AuthzError::UserNotFound)
}

// ── Registration ─────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub photo: String,
    pub dob: Option<NaiveDate>,
}

fn new_user(ctx: &RequestContext, input: CreateUserInput) -> Result<User, AuthzError> {
    let now = Utc::now();
    Ok(User {
        id: UserId::generate(),
        name: input.name,
        email: input.email,
        password: hash_password(&input.password)?,
        phone_number: input.phone_number,
        photo: input.photo,
        dob: input.dob,
        otp: None,
        status: UserStatus::Activated,
        forgot_password_token: None,
        created_by: ctx.actor(),
        updated_by: ctx.actor(),
        created_at: now,
        updated_at: now,
    })
}

pub struct CreateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
    ) -> Result<User, AuthzError> {
        ctx.check()?;
        let user = new_user(ctx, input)?;
        self.users.create(ctx, &user).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }
}

/// Create a user and bind it to `role_id`. The role is checked first so a
/// missing role never leaves an orphan account behind.
pub struct CreateAdminUseCase<U, UR, R>
where
    U: UserRepository,
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub users: U,
    pub user_roles: UR,
    pub roles: R,
}

impl<U, UR, R> CreateAdminUseCase<U, UR, R>
where
    U: UserRepository,
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        input: CreateUserInput,
        role_id: RoleId,
    ) -> Result<(User, UserRole), AuthzError> {
        ctx.check()?;
        self.roles
            .find_by_id(ctx, role_id)
            .await?
            .ok_or(AuthzError::RoleNotFound)?;
        let user = new_user(ctx, input)?;
        self.users.create(ctx, &user).await?;
        let user_role = bind_role(&self.user_roles, &self.roles, ctx, user.id, role_id).await?;
        info!(user_id = %user.id, role_id = %role_id, "admin created");
        Ok((user, user_role))
    }
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub photo: Option<String>,
    pub dob: Option<Option<NaiveDate>>,
}

impl UpdateUserInput {
    fn into_patch(self) -> UserPatch {
        UserPatch {
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            photo: self.photo,
            dob: self.dob,
            ..Default::default()
        }
    }
}

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> Result<User, AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        self.users.update(ctx, &mut user, &input.into_patch()).await?;
        Ok(user)
    }
}

/// Profile update plus, optionally, a role change. Both are locked updates.
pub struct UpdateAdminUseCase<U, UR, R>
where
    U: UserRepository,
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub users: U,
    pub user_roles: UR,
    pub roles: R,
}

impl<U, UR, R> UpdateAdminUseCase<U, UR, R>
where
    U: UserRepository,
    UR: UserRoleRepository,
    R: RoleRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        input: UpdateUserInput,
        role_id: Option<RoleId>,
    ) -> Result<User, AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        self.users.update(ctx, &mut user, &input.into_patch()).await?;
        if let Some(role_id) = role_id {
            bind_role(&self.user_roles, &self.roles, ctx, user_id, role_id).await?;
        }
        info!(user_id = %user_id, "admin updated");
        Ok(user)
    }
}

pub struct ToggleStatusUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ToggleStatusUseCase<U> {
    /// Flip ACTIVATED ↔ DEACTIVATED and return the new status.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<UserStatus, AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        let patch = UserPatch {
            status: Some(user.status.toggled()),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        info!(user_id = %user_id, status = %user.status, "user status changed");
        Ok(user.status)
    }
}

/// Remove an administrative account. Its role binding is removed with it.
pub struct DeleteAdminUseCase<U, UR>
where
    U: UserRepository,
    UR: UserRoleRepository,
{
    pub users: U,
    pub user_roles: UR,
}

impl<U, UR> DeleteAdminUseCase<U, UR>
where
    U: UserRepository,
    UR: UserRoleRepository,
{
    pub async fn execute(&self, ctx: &RequestContext, user_id: UserId) -> Result<(), AuthzError> {
        ctx.check()?;
        if !self.users.delete(ctx, user_id).await? {
            return Err(AuthzError::UserNotFound);
        }
        self.user_roles.forget(ctx, user_id).await?;
        info!(user_id = %user_id, "admin deleted");
        Ok(())
    }
}

// ── Lookups ──────────────────────────────────────────────────────────────────

pub struct FindUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> FindUserUseCase<U> {
    pub async fn execute(&self, ctx: &RequestContext, user_id: UserId) -> Result<User, AuthzError> {
        ctx.check()?;
        load_user(&self.users, ctx, user_id).await
    }
}

/// An administrator together with its role binding. A user without a
/// binding is not an administrator and is reported as not found.
pub struct FindAdminUseCase<U, UR>
where
    U: UserRepository,
    UR: UserRoleRepository,
{
    pub users: U,
    pub user_roles: UR,
}

impl<U, UR> FindAdminUseCase<U, UR>
where
    U: UserRepository,
    UR: UserRoleRepository,
{
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> Result<(User, UserRole), AuthzError> {
        ctx.check()?;
        let user = load_user(&self.users, ctx, user_id).await?;
        let binding = self
            .user_roles
            .find_by_user_id(ctx, user_id)
            .await?
            .ok_or(AuthzError::UserNotFound)?;
        Ok((user, binding))
    }
}

pub struct FindAdminByEmailUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> FindAdminByEmailUseCase<U> {
    pub async fn execute(&self, ctx: &RequestContext, email: &str) -> Result<User, AuthzError> {
        ctx.check()?;
        self.users
            .find_admin_by_email(ctx, email)
            .await?
            .ok_or(AuthzError::UserNotFound)
    }
}

/// Page through ordinary users (no role binding). Returns the page and the
/// number of matching users.
pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        query: UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        ctx.check()?;
        self.users.list(ctx, &query).await
    }
}

pub struct ListAdminsUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListAdminsUseCase<U> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        query: UserQuery,
    ) -> Result<(Vec<User>, u64), AuthzError> {
        ctx.check()?;
        self.users.list_admins(ctx, &query).await
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        if !verify_password(old_password, &user.password)? {
            return Err(AuthzError::InvalidCredentials);
        }
        let patch = UserPatch {
            password: Some(hash_password(new_password)?),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }
}

pub struct IssueOtpUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> IssueOtpUseCase<U> {
    /// Store a fresh numeric OTP on the user and return it for delivery.
    pub async fn execute(&self, ctx: &RequestContext, user_id: UserId) -> Result<String, AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        let otp = random_string(DIGITS, OTP_LEN);
        let patch = UserPatch {
            otp: Some(Some(otp.clone())),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        Ok(otp)
    }
}

pub struct VerifyOtpUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> VerifyOtpUseCase<U> {
    /// `true` and the OTP is consumed on a match; `false` otherwise.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        otp: &str,
    ) -> Result<bool, AuthzError> {
        ctx.check()?;
        let mut user = load_user(&self.users, ctx, user_id).await?;
        if user.otp.as_deref() != Some(otp) {
            return Ok(false);
        }
        let patch = UserPatch {
            otp: Some(None),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        Ok(true)
    }
}

pub struct RequestPasswordResetUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RequestPasswordResetUseCase<U> {
    /// Store a single-use reset token on the account and return it for delivery.
    pub async fn execute(&self, ctx: &RequestContext, email: &str) -> Result<String, AuthzError> {
        ctx.check()?;
        let mut user = self
            .users
            .find_by_email(ctx, email)
            .await?
            .ok_or(AuthzError::UserNotFound)?;
        let token = random_string(LETTERS, RESET_TOKEN_LEN);
        let patch = UserPatch {
            forgot_password_token: Some(Some(token.clone())),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        info!(user_id = %user.id, "password reset requested");
        Ok(token)
    }
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    /// Consume the reset token and set the new password.
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        token: &str,
        new_password: &str,
    ) -> Result<(), AuthzError> {
        ctx.check()?;
        let mut user = self
            .users
            .find_by_reset_token(ctx, token)
            .await?
            .ok_or(AuthzError::InvalidResetToken)?;
        let patch = UserPatch {
            password: Some(hash_password(new_password)?),
            forgot_password_token: Some(None),
            ..Default::default()
        };
        self.users.update(ctx, &mut user, &patch).await?;
        info!(user_id = %user.id, "password reset");
        Ok(())
    }
}
