use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

use super::cache::decode_json;
use super::pool::RedisPool;
use crate::error::{AppError, AppResult};

/// Converts a TTL to whole seconds, rejecting anything under one second
pub(crate) fn ttl_secs(ttl: Duration) -> AppResult<u64> {
    match ttl.as_secs() {
        0 => Err(AppError::InvalidInput(format!(
            "ttl must be at least one second, got {:?}",
            ttl
        ))),
        secs => Ok(secs),
    }
}

/// Redis command helpers over a shared connection pool
///
/// Every method borrows one connection, runs one command and hands the
/// connection back. All keys are namespaced with the configured prefix.
#[derive(Clone)]
pub struct RedisHelper {
    pool: RedisPool,
    prefix: String,
}

impl RedisHelper {
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            prefix: String::new(),
        }
    }

    /// Namespaces every key under `prefix`
    pub fn with_prefix(pool: RedisPool, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Builds a `KEYS` pattern, matching the prefix literally
    fn key_pattern(&self, pattern: &str) -> String {
        let mut escaped = String::with_capacity(self.prefix.len() + pattern.len());
        for c in self.prefix.chars() {
            if matches!(c, '*' | '?' | '[' | ']' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push_str(pattern);
        escaped
    }

    fn strip_prefix(&self, key: String) -> Option<String> {
        if self.prefix.is_empty() {
            return Some(key);
        }
        key.strip_prefix(self.prefix.as_str()).map(str::to_string)
    }

    // Strings

    /// Stores a string that never expires
    #[instrument(level = "debug", skip(self, value))]
    pub async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.pool.connection().await?;
        let _: () = conn.set(self.key(key), value).await?;
        Ok(())
    }

    /// Stores a value as JSON that never expires
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }

    /// Stores `value` only when `key` does not exist yet
    ///
    /// Returns `true` if the value was written.
    #[instrument(level = "debug", skip(self, value))]
    pub async fn set_nx(&self, key: &str, value: &str) -> AppResult<bool> {
        let mut conn = self.pool.connection().await?;
        let written: bool = conn.set_nx(self.key(key), value).await?;
        Ok(written)
    }

    /// Stores a string that expires after `ttl`
    ///
    /// The TTL is truncated to whole seconds and must be at least one second.
    #[instrument(level = "debug", skip(self, value))]
    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let secs = ttl_secs(ttl)?;
        let mut conn = self.pool.connection().await?;
        let _: () = conn.set_ex(self.key(key), value, secs).await?;
        Ok(())
    }

    /// Stores a value as JSON that expires after `ttl`
    pub async fn set_json_ex<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_ex(key, &json, ttl).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.pool.connection().await?;
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    /// Reads a JSON value
    ///
    /// Missing and blank values both come back as `None`. Use `Vec<T>` to
    /// read a JSON array.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let raw = self.get(key).await?;
        decode_json(raw)
    }

    /// Deletes keys, returning how many existed
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, keys: &[&str]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let keys: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let mut conn = self.pool.connection().await?;
        let removed: u64 = conn.del(keys).await?;
        Ok(removed)
    }

    /// Remaining time to live in seconds
    ///
    /// `-2` when the key does not exist, `-1` when it has no expiry.
    #[instrument(level = "debug", skip(self))]
    pub async fn ttl(&self, key: &str) -> AppResult<i64> {
        let mut conn = self.pool.connection().await?;
        let remaining: i64 = conn.ttl(self.key(key)).await?;
        Ok(remaining)
    }

    pub async fn incr(&self, key: &str) -> AppResult<i64> {
        self.incr_by(key, 1).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn incr_by(&self, key: &str, delta: i64) -> AppResult<i64> {
        let mut conn = self.pool.connection().await?;
        let value: i64 = conn.incr(self.key(key), delta).await?;
        Ok(value)
    }

    /// Sets a timeout on `key`, returning `false` if the key does not exist
    ///
    /// A zero TTL deletes the key right away.
    #[instrument(level = "debug", skip(self))]
    pub async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool> {
        let secs = i64::try_from(ttl.as_secs())
            .map_err(|_| AppError::InvalidInput(format!("ttl out of range: {:?}", ttl)))?;
        let mut conn = self.pool.connection().await?;
        let applied: bool = conn.expire(self.key(key), secs).await?;
        Ok(applied)
    }

    // Lists

    /// Inserts `value` at the head of the list, returning the new length
    #[instrument(level = "debug", skip(self, value))]
    pub async fn lpush(&self, key: &str, value: &str) -> AppResult<i64> {
        let mut conn = self.pool.connection().await?;
        let len: i64 = conn.lpush(self.key(key), value).await?;
        Ok(len)
    }

    /// Appends `values` to the tail of the list, returning the new length
    #[instrument(level = "debug", skip(self, values), fields(count = values.len()))]
    pub async fn rpush(&self, key: &str, values: &[&str]) -> AppResult<i64> {
        if values.is_empty() {
            return Err(AppError::InvalidInput(
                "rpush needs at least one value".to_string(),
            ));
        }
        let mut conn = self.pool.connection().await?;
        let len: i64 = conn.rpush(self.key(key), values).await?;
        Ok(len)
    }

    /// Removes and returns the tail of the list
    #[instrument(level = "debug", skip(self))]
    pub async fn rpop(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.pool.connection().await?;
        let value: Option<String> = conn.rpop(self.key(key), None::<NonZeroUsize>).await?;
        Ok(value)
    }

    // Keys

    /// Lists keys matching a glob pattern, with the prefix removed
    ///
    /// `KEYS` blocks the server while it walks the keyspace, so keep this away
    /// from hot paths on large databases.
    #[instrument(level = "debug", skip(self))]
    pub async fn keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut conn = self.pool.connection().await?;
        let found: Vec<String> = conn.keys(self.key_pattern(pattern)).await?;
        Ok(found
            .into_iter()
            .filter_map(|k| self.strip_prefix(k))
            .collect())
    }

    // Sorted sets

    /// Adds `member` with `score`, returning 1 if it was new and 0 if its score was updated
    #[instrument(level = "debug", skip(self))]
    pub async fn zadd(&self, key: &str, score: f64, member: &str) -> AppResult<i64> {
        let mut conn = self.pool.connection().await?;
        let added: i64 = conn.zadd(self.key(key), member, score).await?;
        Ok(added)
    }

    /// Members between `start` and `stop` in ascending score order
    ///
    /// Indices start at 0, are inclusive, and count from the end when negative.
    #[instrument(level = "debug", skip(self))]
    pub async fn zrange(&self, key: &str, start: isize, stop: isize) -> AppResult<Vec<String>> {
        let mut conn = self.pool.connection().await?;
        let members: Vec<String> = conn.zrange(self.key(key), start, stop).await?;
        Ok(members)
    }

    // Hashes

    #[instrument(level = "debug", skip(self))]
    pub async fn hget(&self, key: &str, field: &str) -> AppResult<Option<String>> {
        let mut conn = self.pool.connection().await?;
        let value: Option<String> = conn.hget(self.key(key), field).await?;
        Ok(value)
    }

    /// Reads several fields at once, in the order requested
    #[instrument(level = "debug", skip(self))]
    pub async fn hmget(&self, key: &str, fields: &[&str]) -> AppResult<Vec<Option<String>>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        // HGET with a single field would reply with a bare value
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(self.key(key)).arg(fields);
        self.pool.execute(&cmd).await
    }

    /// Sets one field, returning 1 if the field is new
    #[instrument(level = "debug", skip(self, value))]
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> AppResult<i64> {
        let mut conn = self.pool.connection().await?;
        let added: i64 = conn.hset(self.key(key), field, value).await?;
        Ok(added)
    }

    /// Sets every field of `hash`
    #[instrument(level = "debug", skip(self, hash), fields(count = hash.len()))]
    pub async fn hmset(&self, key: &str, hash: &HashMap<String, String>) -> AppResult<()> {
        if hash.is_empty() {
            return Ok(());
        }
        let items: Vec<(&str, &str)> = hash.iter().map(|(f, v)| (f.as_str(), v.as_str())).collect();
        let mut conn = self.pool.connection().await?;
        let _: () = conn.hset_multiple(self.key(key), &items).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn hexists(&self, key: &str, field: &str) -> AppResult<bool> {
        let mut conn = self.pool.connection().await?;
        let exists: bool = conn.hexists(self.key(key), field).await?;
        Ok(exists)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn hgetall(&self, key: &str) -> AppResult<HashMap<String, String>> {
        let mut conn = self.pool.connection().await?;
        let hash: HashMap<String, String> = conn.hgetall(self.key(key)).await?;
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper(prefix: &str) -> RedisHelper {
        let pool = RedisPool::from_url("redis://127.0.0.1:6379").unwrap();
        RedisHelper::with_prefix(pool, prefix)
    }

    #[test]
    fn test_ttl_secs_whole_seconds() {
        assert_eq!(ttl_secs(Duration::from_secs(90)).unwrap(), 90);
        assert_eq!(ttl_secs(Duration::from_secs(2 * 24 * 3600)).unwrap(), 172_800);
    }

    #[test]
    fn test_ttl_secs_truncates_fraction() {
        assert_eq!(ttl_secs(Duration::from_millis(1999)).unwrap(), 1);
    }

    #[test]
    fn test_ttl_secs_rejects_sub_second() {
        let err = ttl_secs(Duration::from_millis(999)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_key_applies_prefix() {
        let helper = helper("app:");
        assert_eq!(helper.key("session"), "app:session");
        assert_eq!(helper.key("*"), "app:*");
    }

    #[tokio::test]
    async fn test_key_without_prefix_is_untouched() {
        let helper = RedisHelper::new(RedisPool::from_url("redis://127.0.0.1:6379").unwrap());
        assert_eq!(helper.prefix(), "");
        assert_eq!(helper.key("session"), "session");
    }

    #[tokio::test]
    async fn test_key_pattern_escapes_prefix_globs() {
        assert_eq!(helper("app:").key_pattern("*"), "app:*");

        let globby = helper("app[1]*?\\:");
        assert_eq!(globby.key_pattern("user:*"), "app\\[1\\]\\*\\?\\\\:user:*");
    }

    #[tokio::test]
    async fn test_expire_rejects_out_of_range_ttl_before_connecting() {
        let pool = RedisPool::from_url("redis://127.0.0.1:1").unwrap();
        let helper = RedisHelper::new(pool);
        let err = helper.expire("k", Duration::MAX).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_strip_prefix() {
        let helper = helper("app:");
        assert_eq!(helper.strip_prefix("app:a".to_string()), Some("a".to_string()));
        assert_eq!(helper.strip_prefix("other:a".to_string()), None);
    }

    #[tokio::test]
    async fn test_set_ex_rejects_zero_ttl_before_connecting() {
        let helper = helper("");
        let err = helper.set_ex("k", "v", Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_round_trip() {
        // Pool points at a closed port; any round trip would fail
        let pool = RedisPool::from_url("redis://127.0.0.1:1").unwrap();
        let helper = RedisHelper::new(pool);

        assert_eq!(helper.delete(&[]).await.unwrap(), 0);
        assert!(helper.hmget("h", &[]).await.unwrap().is_empty());
        helper.hmset("h", &HashMap::new()).await.unwrap();
        assert!(matches!(
            helper.rpush("l", &[]).await.unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }
}
