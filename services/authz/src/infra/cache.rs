use anyhow::Context as _;
use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};
use warden_core::context::RequestContext;

use crate::domain::repository::AuthzCache;
use crate::error::AuthzError;

/// Keys fetched per SCAN round trip during bulk removal.
const SCAN_BATCH: usize = 500;

#[derive(Clone)]
pub struct RedisAuthzCache {
    pub pool: Pool,
}

impl RedisAuthzCache {
    async fn conn(&self) -> Result<deadpool_redis::Connection, AuthzError> {
        self.pool
            .get()
            .await
            .map_err(|e| AuthzError::Internal(e.into()))
    }
}

impl AuthzCache for RedisAuthzCache {
    async fn get(&self, ctx: &RequestContext, key: &str) -> Result<Option<Vec<u8>>, AuthzError> {
        ctx.guard(async {
            let mut conn = self.conn().await?;
            let value: Option<Vec<u8>> = conn
                .get(key)
                .await
                .map_err(|e: redis::RedisError| AuthzError::Internal(e.into()))?;
            Ok(value)
        })
        .await
    }

    async fn set(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), AuthzError> {
        ctx.guard(async {
            let mut conn = self.conn().await?;
            let (): () = conn
                .set_ex(key, value, ttl_secs)
                .await
                .map_err(|e: redis::RedisError| AuthzError::Internal(e.into()))?;
            Ok(())
        })
        .await
    }

    async fn incr(&self, ctx: &RequestContext, key: &str) -> Result<u64, AuthzError> {
        ctx.guard(async {
            let mut conn = self.conn().await?;
            let value: u64 = conn
                .incr(key, 1u64)
                .await
                .with_context(|| format!("increment {key}"))?;
            Ok(value)
        })
        .await
    }

    /// SCAN MATCH the pattern and DEL each batch. Not atomic: a key written
    /// while the scan is running may survive it, but only under a generation
    /// that has already been retired.
    async fn bulk_remove(&self, ctx: &RequestContext, pattern: &str) -> Result<u64, AuthzError> {
        ctx.guard(async {
            let mut conn = self.conn().await?;
            let mut cursor: u64 = 0;
            let mut removed: u64 = 0;
            loop {
                let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH)
                    .query_async(&mut conn)
                    .await
                    .with_context(|| format!("scan cache keys matching {pattern}"))?;
                if !keys.is_empty() {
                    let n: u64 = conn
                        .del(&keys)
                        .await
                        .with_context(|| format!("delete cache keys matching {pattern}"))?;
                    removed += n;
                }
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            Ok(removed)
        })
        .await
    }
}
