//! Pooled Redis connections with a set of typed command helpers.
//!
//! [`RedisPool`] hands out connections from a deadpool-managed pool and takes
//! them back when they are dropped. [`RedisHelper`] wraps the pool with one
//! method per supported command: strings (optionally JSON encoded, optionally
//! with a TTL), hashes, lists, sorted sets, key enumeration, counters and
//! expiry.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use redis_kit::{PoolSettings, RedisHelper, RedisPool};
//!
//! # async fn example() -> redis_kit::error::AppResult<()> {
//! let pool = RedisPool::connect(&PoolSettings::default()).await?;
//! let redis = RedisHelper::with_prefix(pool, "app:");
//!
//! redis.set_ex("session:1", "active", Duration::from_secs(600)).await?;
//! let hits = redis.incr("hits").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;

pub use db::{CacheStore, PoolSettings, RedisHelper, RedisPool};
