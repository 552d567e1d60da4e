/// Read-through caching over any [`CacheStore`](crate::db::redis::CacheStore).
///
/// On a hit the cached value is decoded and returned. On a miss the future is
/// awaited, its output is stored as JSON for `$ttl`, and then returned. Errors
/// from the store or the future are propagated with `?`, so the macro must be
/// used inside a function returning `AppResult`.
///
/// # Arguments
/// * `$store`: the store, passed by place (it is borrowed by the macro).
/// * `$key`: the cache key.
/// * `$ttl`: a `Duration`, at least one second.
/// * `$block`: a future yielding `AppResult<T>` for the value on a miss.
///
/// # Example
/// ```rust,no_run
/// # use std::time::Duration;
/// # use redis_kit::{cached, error::AppResult, RedisHelper};
/// # async fn compute_expensive_value() -> AppResult<Vec<String>> { Ok(vec![]) }
/// async fn load(helper: &RedisHelper) -> AppResult<Vec<String>> {
///     cached!(*helper, "report:daily", Duration::from_secs(300), async move {
///         compute_expensive_value().await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($store:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $crate::db::redis::get_cached(&$store, &$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $crate::db::redis::put_cached(&$store, &$key, &value, $ttl).await?;
            Ok(value)
        }
    }};
}
