use anyhow::{anyhow, Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo};
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

/// Redis connection handle shared by every request worker.
///
/// `ConnectionManager` multiplexes one connection and reconnects on its own,
/// so handing out clones is cheap.
#[derive(Clone)]
pub struct RedisPool {
    manager: ConnectionManager,
    addr_label: String,
}

impl RedisPool {
    /// Connect to `redis_url`, failing if the first connection takes longer
    /// than `connect_timeout`.
    pub async fn connect(redis_url: &str, connect_timeout: Duration) -> Result<Self> {
        let info: ConnectionInfo = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;
        let addr_label = addr_label(&info.addr);

        let client = Client::open(info).context("failed to construct Redis client")?;
        let manager = timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                anyhow!(
                    "timed out after {:?} connecting to Redis at {}",
                    connect_timeout,
                    addr_label
                )
            })?
            .context("failed to initialize Redis connection manager")?;

        info!("Connected to Redis at {}", addr_label);
        Ok(Self {
            manager,
            addr_label,
        })
    }

    pub fn manager(&self) -> ConnectionManager {
        self.manager.clone()
    }

    pub fn addr_label(&self) -> &str {
        &self.addr_label
    }

    /// Round-trip a `PING`.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis PING failed")?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(anyhow!("unexpected PING response: {}", pong))
        }
    }
}

/// Host and port for logs, without credentials.
fn addr_label(addr: &ConnectionAddr) -> String {
    match addr {
        ConnectionAddr::Tcp(host, port) => format!("{}:{}", host, port),
        other => format!("{:?}", other),
    }
}
