use anyhow::{Context, Result};
use jwt_security::{InMemoryTokenBlacklist, RedisTokenBlacklist, TokenValidityStore};
use redis_utils::RedisPool;
use std::sync::Arc;

use crate::config::TokenStoreConfig;

/// Build the revocation store selected by configuration.
pub async fn build_token_store(config: &TokenStoreConfig) -> Result<Arc<dyn TokenValidityStore>> {
    match config {
        TokenStoreConfig::Memory => {
            tracing::warn!(
                "Using in-memory token store; revocations are not shared between instances"
            );
            Ok(Arc::new(InMemoryTokenBlacklist::new()))
        }
        TokenStoreConfig::Redis(redis) => {
            let pool = RedisPool::connect(&redis.url, redis.connect_timeout)
                .await
                .context("Failed to initialize Redis token store")?;
            pool.ping().await?;

            tracing::info!(
                addr = %pool.addr_label(),
                operation_timeout_ms = redis.operation_timeout.as_millis() as u64,
                "Redis token store ready"
            );
            Ok(Arc::new(RedisTokenBlacklist::new(
                pool.manager(),
                redis.operation_timeout,
            )))
        }
    }
}
