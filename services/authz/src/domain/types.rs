use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use warden_domain::id::{PermissionId, RoleId, RolePermissionId, UserId, UserRoleId};
use warden_domain::pagination::PageRequest;
use warden_domain::user::UserStatus;

/// User account. `password` holds the argon2 hash, never the plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub photo: String,
    pub dob: Option<NaiveDate>,
    pub otp: Option<String>,
    pub status: UserStatus,
    pub forgot_password_token: Option<String>,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Capability atom such as `user.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub label: String,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A permission as granted to a role, in grant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedPermission {
    pub role_permission_id: RolePermissionId,
    pub permission: Permission,
}

/// Role with its complete, ordered permission set.
///
/// This is also the cached snapshot for the role-by-id family, which is why
/// permission edits must invalidate role entries too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: Vec<GrantedPermission>,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join row between a role and a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: RolePermissionId,
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub created_at: DateTime<Utc>,
}

/// The single role bound to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    pub created_by: Option<UserId>,
    pub updated_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing roles.
#[derive(Debug, Clone, Default)]
pub struct RoleQuery {
    /// Substring match on the role name.
    pub name: Option<String>,
    pub page: PageRequest,
}

/// Filter for listing permissions.
#[derive(Debug, Clone, Default)]
pub struct PermissionQuery {
    /// Substring match on the permission name.
    pub name: Option<String>,
    pub page: PageRequest,
}

/// Column a user listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSort {
    #[default]
    CreatedAt,
    Name,
    Email,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter for user listings. `search` is a case-insensitive substring match
/// on name, email or phone number.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub sort: UserSort,
    pub order: SortOrder,
    pub page: PageRequest,
}

/// TTL of populated cache entries: one month.
pub const ONE_MONTH_SECS: u64 = 2_592_000;

/// OTP length in digits.
pub const OTP_LEN: usize = 4;

/// Forgot-password token length in characters.
pub const RESET_TOKEN_LEN: usize = 30;
