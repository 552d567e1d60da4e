pub mod redis;

pub use self::redis::{CacheStore, PoolSettings, RedisHelper, RedisPool};
