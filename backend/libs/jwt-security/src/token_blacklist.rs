//! Token blacklist for bearer token revocation using Redis
//!
//! Entries expire with the token they revoke, so the key space stays bounded
//! without a cleanup job.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

use crate::{revocation_key, StoreError, TokenValidityStore};

const KEY_PREFIX: &str = "hotel:revoked_token";

/// Redis-backed revocation list
///
/// **Key format**: `hotel:revoked_token:{revocation_key}`
/// **Value**: `1` (marker only, the token itself is never stored)
///
/// Every Redis round trip is bounded by `operation_timeout`; an expired
/// timeout surfaces as [`StoreError::Timeout`].
#[derive(Clone)]
pub struct RedisTokenBlacklist {
    redis: ConnectionManager,
    operation_timeout: Duration,
}

impl RedisTokenBlacklist {
    pub fn new(redis: ConnectionManager, operation_timeout: Duration) -> Self {
        Self {
            redis,
            operation_timeout,
        }
    }

    fn key(token: &str) -> String {
        format!("{}:{}", KEY_PREFIX, revocation_key(token))
    }

    async fn bounded<T>(&self, op: impl Future<Output = RedisResult<T>>) -> Result<T, StoreError> {
        match timeout(self.operation_timeout, op).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.operation_timeout)),
        }
    }

    /// Remove a revocation entry so tests leave Redis clean
    #[cfg(test)]
    async fn remove(&self, token: &str) -> Result<(), StoreError> {
        let key = Self::key(token);
        let mut conn = self.redis.clone();

        self.bounded(redis::cmd("DEL").arg(&key).query_async::<_, ()>(&mut conn))
            .await?;

        info!("Token removed from revocation list");
        Ok(())
    }
}

#[async_trait]
impl TokenValidityStore for RedisTokenBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let key = Self::key(token);
        let mut conn = self.redis.clone();

        let exists: i64 = self
            .bounded(redis::cmd("EXISTS").arg(&key).query_async(&mut conn))
            .await?;

        match exists {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(StoreError::MalformedResponse(format!(
                "EXISTS returned {} for a single key",
                other
            ))),
        }
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), StoreError> {
        let key = Self::key(token);
        // Redis rejects EX 0
        let ttl_secs = ttl.as_secs().max(1);
        let mut conn = self.redis.clone();

        self.bounded(
            redis::cmd("SET")
                .arg(&key)
                .arg("1")
                .arg("EX")
                .arg(ttl_secs)
                .query_async::<_, ()>(&mut conn),
        )
        .await?;

        info!(ttl = ttl_secs, "Token added to revocation list");
        Ok(())
    }
}
