use crate::cache::{CacheBackend, CacheError, CacheResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use std::time::Duration;

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        if err.is_connection_dropped() || err.is_connection_refusal() || err.is_io_error() {
            CacheError::ConnectionFailed(err.to_string())
        } else {
            CacheError::OperationFailed(err.to_string())
        }
    }
}

/// Redis-backed cache
///
/// Uses a `ConnectionManager`, which reconnects on its own and is cheap to
/// clone, so one instance is shared by every request.
#[derive(Clone)]
pub struct RedisCacheBackend {
    connection: ConnectionManager,
}

impl RedisCacheBackend {
    /// Connect and verify the server answers `PING`
    pub async fn new(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionFailed(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::ConnectionFailed(format!("Failed to connect to Redis: {}", e)))?;

        // Test connection
        let mut test_conn = connection.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut test_conn)
            .await
            .map_err(|e| {
                CacheError::ConnectionFailed(format!("Redis connection test failed: {}", e))
            })?;

        tracing::info!("Redis cache connection successful");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let mut conn = self.connection.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<Vec<u8>>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);

        if let Some(ttl) = ttl {
            // PX keeps sub-second precision; Redis rejects a zero expiry
            let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
            cmd.arg("PX").arg(millis);
        }

        cmd.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_fails_construction() {
        let result = RedisCacheBackend::new("redis://127.0.0.1:1/").await;
        assert!(matches!(result, Err(CacheError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_construction() {
        let result = RedisCacheBackend::new("not a url").await;
        assert!(matches!(result, Err(CacheError::ConnectionFailed(_))));
    }
}
