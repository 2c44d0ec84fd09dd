//! Bearer token revocation state
//!
//! **Features**:
//! - [`TokenValidityStore`]: the lookup/revoke capability consumed by the
//!   request pipeline
//! - [`RedisTokenBlacklist`]: shared store for multi-instance deployments
//! - [`InMemoryTokenBlacklist`]: process-local store for development and tests
//! - Revocation key and TTL derivation from unverified JWT claims
//!
//! Tokens are never stored raw. A JWT carrying a `jti` is keyed by that id,
//! anything else by the SHA-256 digest of the full token.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod memory_blacklist;
pub mod revocation_key;
pub mod token_blacklist;

#[cfg(test)]
mod test_utils;

pub use memory_blacklist::InMemoryTokenBlacklist;
pub use revocation_key::{revocation_key, revocation_ttl};
pub use token_blacklist::RedisTokenBlacklist;

/// Errors raised by a token store. Callers decide whether to fail open.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Token store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Malformed token store response: {0}")]
    MalformedResponse(String),
}

/// Revocation lookup and write capability shared across all requests.
#[async_trait]
pub trait TokenValidityStore: Send + Sync {
    /// Whether `token` was revoked before its natural expiry.
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError>;

    /// Mark `token` as revoked for `ttl`.
    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), StoreError>;
}
