use std::time::Duration;

use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime, Timeouts};
use redis::{Cmd, FromRedisValue};

use crate::error::{AppError, AppResult};

/// Settings for the Redis connection pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Redis connection URL
    pub url: String,
    /// Maximum number of connections held by the pool
    pub max_size: usize,
    /// Applied to waiting for a slot, creating and recycling a connection
    pub timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Snapshot of the pool's occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
}

/// Pool of Redis connections
///
/// Connections are borrowed with [`RedisPool::connection`] and go back to the
/// pool when the returned guard is dropped, whether the command succeeded or not.
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Creates a pool without opening any connection
    pub fn new(settings: &PoolSettings) -> AppResult<Self> {
        let mut pool_config = PoolConfig::new(settings.max_size);
        pool_config.timeouts = Timeouts {
            wait: Some(settings.timeout),
            create: Some(settings.timeout),
            recycle: Some(settings.timeout),
        };

        let mut cfg = Config::from_url(settings.url.clone());
        cfg.pool = Some(pool_config);

        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        tracing::info!(max_size = settings.max_size, "Redis connection pool created");

        Ok(Self { pool })
    }

    /// Creates a pool for `url` with default sizing
    pub fn from_url(url: &str) -> AppResult<Self> {
        Self::new(&PoolSettings {
            url: url.to_string(),
            ..PoolSettings::default()
        })
    }

    /// Creates a pool and checks the server answers `PING`
    pub async fn connect(settings: &PoolSettings) -> AppResult<Self> {
        let pool = Self::new(settings)?;
        pool.ping().await?;
        tracing::info!("Redis connection pool established");
        Ok(pool)
    }

    /// Borrows a connection from the pool
    pub async fn connection(&self) -> AppResult<Connection> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to acquire Redis connection");
            e.into()
        })
    }

    /// Runs a single command on a pooled connection and decodes the reply
    pub async fn execute<T: FromRedisValue>(&self, cmd: &Cmd) -> AppResult<T> {
        let mut conn = self.connection().await?;
        let value: T = cmd.query_async(&mut conn).await?;
        Ok(value)
    }

    /// Runs a single command on a pooled connection, discarding the reply
    pub async fn run(&self, cmd: &Cmd) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        let reply: String = self.execute(&redis::cmd("PING")).await?;
        check_pong(&reply)
    }

    pub fn status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            max_size: status.max_size,
            size: status.size,
            available: status.available,
        }
    }
}

fn check_pong(reply: &str) -> AppResult<()> {
    if reply == "PONG" {
        Ok(())
    } else {
        Err(AppError::Internal(format!("unexpected PING reply: {}", reply)))
    }
}
