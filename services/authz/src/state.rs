use std::sync::Arc;

use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;
use warden_auth_types::gate::{AccessGate, Issuers};
use warden_auth_types::token::JwtValidator;

use crate::config::AuthzConfig;
use crate::infra::cache::RedisAuthzCache;
use crate::infra::cached::{
    CacheLayer, CachedPermissionRepository, CachedRolePermissionRepository, CachedRoleRepository,
    CachedUserRoleRepository,
};
use crate::infra::db::{
    DbPermissionRepository, DbRolePermissionRepository, DbRoleRepository, DbUserRepository,
    DbUserRoleRepository,
};
use crate::infra::keys::CacheKeys;

/// Shared handles. Every RBAC repository handed out is wrapped in the cache layer.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub keys: CacheKeys,
    pub cache_ttl_secs: u64,
    pub gate: AccessGate,
}

impl AppState {
    pub fn new(config: &AuthzConfig, db: DatabaseConnection, redis: RedisPool) -> Self {
        let issuers = Issuers {
            user: config.jwt_issuer.clone(),
            admin: config.jwt_issuer_admin.clone(),
        };
        Self {
            db,
            redis,
            keys: CacheKeys::new(config.cache_prefix.clone()),
            cache_ttl_secs: config.cache_ttl_secs,
            gate: AccessGate::new(Arc::new(JwtValidator::new(&config.jwt_secret)), issuers),
        }
    }

    fn cache_layer(&self) -> CacheLayer<RedisAuthzCache> {
        CacheLayer {
            cache: RedisAuthzCache {
                pool: self.redis.clone(),
            },
            keys: self.keys.clone(),
            ttl_secs: self.cache_ttl_secs,
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_repo(&self) -> CachedRoleRepository<DbRoleRepository, RedisAuthzCache> {
        CachedRoleRepository {
            inner: DbRoleRepository {
                db: self.db.clone(),
            },
            layer: self.cache_layer(),
        }
    }

    pub fn permission_repo(
        &self,
    ) -> CachedPermissionRepository<DbPermissionRepository, RedisAuthzCache> {
        CachedPermissionRepository {
            inner: DbPermissionRepository {
                db: self.db.clone(),
            },
            layer: self.cache_layer(),
        }
    }

    pub fn role_permission_repo(
        &self,
    ) -> CachedRolePermissionRepository<DbRolePermissionRepository, RedisAuthzCache> {
        CachedRolePermissionRepository {
            inner: DbRolePermissionRepository {
                db: self.db.clone(),
            },
            layer: self.cache_layer(),
        }
    }

    pub fn user_role_repo(
        &self,
    ) -> CachedUserRoleRepository<DbUserRoleRepository, RedisAuthzCache> {
        CachedUserRoleRepository {
            inner: DbUserRoleRepository {
                db: self.db.clone(),
            },
            layer: self.cache_layer(),
        }
    }
}
