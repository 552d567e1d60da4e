use std::time::Duration;

use serde::Deserialize;

use crate::db::redis::PoolSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_pool_max_size")]
    pub redis_pool_max_size: usize,

    /// Wait, create and recycle timeout for pooled connections, in seconds
    #[serde(default = "default_pool_timeout_secs")]
    pub redis_pool_timeout_secs: u64,

    /// Prefix prepended to every key
    #[serde(default)]
    pub redis_key_prefix: String,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_pool_max_size() -> usize {
    16
}

fn default_pool_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            url: self.redis_url.clone(),
            max_size: self.redis_pool_max_size,
            timeout: Duration::from_secs(self.redis_pool_timeout_secs),
        }
    }
}
