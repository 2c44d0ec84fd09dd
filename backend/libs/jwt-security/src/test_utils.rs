//! Test utilities for revocation store testing
//!
//! Provides Redis connections for tests that must skip cleanly when no
//! server is running.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::Client;
use std::env;
use std::time::Duration;

/// Get Redis connection for testing
///
/// Uses REDIS_TEST_URL environment variable or defaults to localhost
pub async fn get_test_redis_connection() -> Result<ConnectionManager> {
    let redis_url =
        env::var("REDIS_TEST_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let client = Client::open(redis_url).context("Failed to create Redis client")?;

    tokio::time::timeout(Duration::from_secs(2), ConnectionManager::new(client))
        .await
        .context("Timed out connecting to Redis")?
        .context("Failed to connect to Redis")
}
