pub mod cache;
pub mod commands;
pub mod pool;

mod macros;

pub use cache::{get_cached, put_cached, CacheStore};
pub use commands::RedisHelper;
pub use pool::{PoolSettings, PoolStatus, RedisPool};
