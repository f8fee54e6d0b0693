use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Connection, Pool, PoolError, Runtime};
use hoard_core::{CollectionStore, KeyValueStore, StoreError};
use redis::AsyncCommands;

use crate::config::RedisConfig;

/// Redis-backed store over a shared connection pool.
///
/// Payloads are stored as plain strings with EX expiries. Operations that
/// must pair a mutation with an expiry reset (collection pushes) run as
/// MULTI/EXEC pipelines so they hit the backend as one atomic unit.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Opens a pool against the configured server.
    pub fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let pool = deadpool_redis::Config::from_url(&config.url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::connection(e.to_string()))?;
        tracing::info!(url = %config.url, "redis store connected");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<Connection, StoreError> {
        self.pool.get().await.map_err(|e| match e {
            PoolError::Closed => StoreError::Closed,
            other => StoreError::connection(other.to_string()),
        })
    }
}

fn command_error(err: redis::RedisError) -> StoreError {
    StoreError::backend(err.to_string())
}

// Redis EX expiries are whole seconds and zero is rejected, so sub-second
// TTLs clamp to one second.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn.get(key).await.map_err(command_error)?;
        Ok(payload)
    }

    async fn put(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_secs(ttl))
            .await
            .map_err(command_error)
    }

    async fn put_if_absent(
        &self,
        key: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        // SET NX EX in one command; a nil reply means the key already held
        // a value and nothing was written.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(reply.is_some())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn().await?;
        let payloads: Vec<Option<String>> = conn.mget(keys).await.map_err(command_error)?;
        Ok(payloads)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key).await.map_err(command_error)
    }

    async fn delete_prefixed(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let keys: Vec<String> = conn
            .keys(format!("{prefix}*"))
            .await
            .map_err(command_error)?;
        if keys.is_empty() {
            return Ok(0);
        }
        conn.del::<_, ()>(&keys).await.map_err(command_error)?;
        Ok(keys.len() as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let updated: bool = conn
            .expire(key, ttl_secs(ttl) as i64)
            .await
            .map_err(command_error)?;
        Ok(updated)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn().await?;
        let found: bool = conn.exists(key).await.map_err(command_error)?;
        Ok(found)
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close();
        tracing::info!("redis store closed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

#[async_trait]
impl CollectionStore for RedisStore {
    async fn list_push_front(
        &self,
        key: &str,
        payloads: &[String],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        if payloads.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        match ttl {
            Some(ttl) => {
                let mut pipe = redis::pipe();
                pipe.atomic()
                    .lpush(key, payloads)
                    .ignore()
                    .expire(key, ttl_secs(ttl) as i64)
                    .ignore();
                let _: () = pipe.query_async(&mut conn).await.map_err(command_error)?;
                Ok(())
            }
            None => conn.lpush::<_, _, ()>(key, payloads).await.map_err(command_error),
        }
    }

    async fn list_push_bounded(
        &self,
        key: &str,
        payloads: &[String],
        capacity: usize,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        if payloads.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        // Push then trim to the head `capacity` elements inside MULTI/EXEC:
        // the oldest (tail) entries are evicted and two concurrent pushes
        // cannot observe an intermediate length.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .lpush(key, payloads)
            .ignore()
            .ltrim(key, 0, capacity as isize - 1)
            .ignore();
        if let Some(ttl) = ttl {
            pipe.expire(key, ttl_secs(ttl) as i64).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await.map_err(command_error)?;
        Ok(())
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        let payloads: Vec<String> = conn.lrange(key, 0, -1).await.map_err(command_error)?;
        Ok(payloads)
    }

    async fn list_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let len: u64 = conn.llen(key).await.map_err(command_error)?;
        Ok(len)
    }

    async fn set_add(
        &self,
        key: &str,
        payloads: &[String],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        if payloads.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .sadd(key, payloads)
            .ignore()
            .expire(key, ttl_secs(ttl) as i64)
            .ignore();
        let _: () = pipe.query_async(&mut conn).await.map_err(command_error)?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, payloads: &[String]) -> Result<(), StoreError> {
        if payloads.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn().await?;
        conn.srem::<_, _, ()>(key, payloads).await.map_err(command_error)
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        let members: Vec<String> = conn.smembers(key).await.map_err(command_error)?;
        Ok(members)
    }

    async fn set_len(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn().await?;
        let len: u64 = conn.scard(key).await.map_err(command_error)?;
        Ok(len)
    }
}
