//! Process-local revocation list
//!
//! Only suitable for a single instance: revocations are not shared and are
//! lost on restart.

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::{revocation_key, StoreError, TokenValidityStore};

#[derive(Debug, Default)]
pub struct InMemoryTokenBlacklist {
    entries: DashMap<String, Instant>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenValidityStore for InMemoryTokenBlacklist {
    async fn is_revoked(&self, token: &str) -> Result<bool, StoreError> {
        let key = revocation_key(token);
        // Copy out before removing; holding the shard guard across remove deadlocks.
        let expires_at = self.entries.get(&key).map(|entry| *entry.value());

        match expires_at {
            Some(expires_at) if expires_at > Instant::now() => Ok(true),
            Some(_) => {
                self.entries.remove(&key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke(&self, token: &str, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        // Entries whose token is never presented again are only dropped here.
        self.entries.retain(|_, expires_at| *expires_at > now);
        self.entries.insert(revocation_key(token), now + ttl);
        tracing::info!(ttl_ms = ttl.as_millis() as u64, "Token added to revocation list");
        Ok(())
    }
}
