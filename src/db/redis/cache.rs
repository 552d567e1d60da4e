use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::commands::RedisHelper;
use crate::error::AppResult;

/// Raw string storage behind the read-through helpers and [`cached!`](crate::cached)
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn fetch_raw(&self, key: &str) -> AppResult<Option<String>>;

    async fn store_raw(&self, key: &str, value: String, ttl: Duration) -> AppResult<()>;
}

#[async_trait::async_trait]
impl CacheStore for RedisHelper {
    async fn fetch_raw(&self, key: &str) -> AppResult<Option<String>> {
        self.get(key).await
    }

    async fn store_raw(&self, key: &str, value: String, ttl: Duration) -> AppResult<()> {
        self.set_ex(key, &value, ttl).await
    }
}

/// Decodes a stored JSON value, treating missing and blank values as absent
pub(crate) fn decode_json<T: DeserializeOwned>(raw: Option<String>) -> AppResult<Option<T>> {
    match raw {
        Some(json) if !json.trim().is_empty() => Ok(Some(serde_json::from_str(&json)?)),
        _ => Ok(None),
    }
}

/// Retrieves a value from the cache by key
///
/// Returns `None` on a miss. A value that is present but not valid JSON for
/// `T` is an error rather than a miss.
pub async fn get_cached<S, T>(store: &S, key: &str) -> AppResult<Option<T>>
where
    S: CacheStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = store.fetch_raw(key).await?;
    let value = decode_json(raw)?;
    if value.is_some() {
        tracing::debug!(key = %key, "Cache hit");
    } else {
        tracing::debug!(key = %key, "Cache miss");
    }
    Ok(value)
}

/// Serializes `value` as JSON and stores it for `ttl`
pub async fn put_cached<S, T>(store: &S, key: &str, value: &T, ttl: Duration) -> AppResult<()>
where
    S: CacheStore + ?Sized,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.store_raw(key, json, ttl).await
}
