use redis_kit::config::Config;
use redis_kit::{RedisHelper, RedisPool};
use tracing_subscriber::EnvFilter;

const SMOKE_KEY: &str = "redis-kit:smoke";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("redis_kit=info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = RedisPool::connect(&config.pool_settings()).await?;
    let redis = RedisHelper::with_prefix(pool, config.redis_key_prefix.clone());

    redis.set(SMOKE_KEY, "ok").await?;
    let value = redis.get(SMOKE_KEY).await?;
    tracing::info!(key = SMOKE_KEY, value = ?value, "Smoke check read back");

    redis.delete(&[SMOKE_KEY]).await?;

    let status = redis.pool().status();
    tracing::info!(
        size = status.size,
        available = status.available,
        max_size = status.max_size,
        "Smoke check complete"
    );

    if value.as_deref() != Some("ok") {
        anyhow::bail!("smoke check read back {:?}, expected \"ok\"", value);
    }

    Ok(())
}
