//! Cache key families.
//!
//! One family per lookup shape. Each family has a key builder for reads, a
//! wildcard pattern used to drop the whole family on invalidation, and a
//! generation counter. Entry keys embed the generation current when the
//! reader started, so a snapshot loaded before a write lands under a key no
//! later reader will ask for.

use warden_domain::id::{PermissionId, RoleId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    UserRole,
    Permission,
    RolePermission,
    Role,
}

impl KeyFamily {
    fn segment(self) -> &'static str {
        match self {
            Self::UserRole => "user-role:find-by-user-id",
            Self::Permission => "permission:find-by-name",
            Self::RolePermission => "role-permission:find-by-role-id-and-permission-id",
            Self::Role => "role:find-by-id",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn entry(&self, family: KeyFamily, generation: u64, lookup: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            self.prefix,
            family.segment(),
            generation,
            lookup
        )
    }

    /// Glob matching every entry of the family, whatever its generation.
    pub fn pattern(&self, family: KeyFamily) -> String {
        format!("{}:{}:*", self.prefix, family.segment())
    }

    /// Counter bumped on every invalidation of the family. Never matched by
    /// any family pattern.
    pub fn generation(&self, family: KeyFamily) -> String {
        format!("{}:generation:{}", self.prefix, family.segment())
    }

    pub fn user_role_by_user_id(&self, generation: u64, user_id: UserId) -> String {
        self.entry(KeyFamily::UserRole, generation, &user_id.to_string())
    }

    pub fn permission_by_name(&self, generation: u64, name: &str) -> String {
        self.entry(KeyFamily::Permission, generation, name)
    }

    pub fn role_permission_by_pair(
        &self,
        generation: u64,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> String {
        self.entry(
            KeyFamily::RolePermission,
            generation,
            &format!("{role_id}:{permission_id}"),
        )
    }

    pub fn role_by_id(&self, generation: u64, role_id: RoleId) -> String {
        self.entry(KeyFamily::Role, generation, &role_id.to_string())
    }
}
