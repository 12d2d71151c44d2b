use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use remember::RemoteClient;
use shared::{Error, Result};
use std::time::Duration;
use tracing::info;

/// Redis client over a multiplexed tokio connection
#[derive(Clone)]
pub struct RedisClient {
    conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::Config(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(Error::backend_read)?;
        info!("Connected to redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl RemoteClient for RedisClient {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(Error::backend_read)?;

        // nil reply
        value.map(Bytes::from).ok_or(Error::NotFound)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value.as_ref());
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(px_millis(ttl));
        }

        let _: () = cmd.query_async(&mut conn).await.map_err(Error::backend_write)?;
        Ok(())
    }
}

/// PX rejects 0 and anything above `i64::MAX`
fn px_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX).max(1)
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_millis_bounds() {
        assert_eq!(px_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(px_millis(Duration::from_micros(10)), 1);
        assert_eq!(px_millis(Duration::MAX), i64::MAX);
        assert_eq!(px_millis(Duration::from_secs(u64::MAX / 1000 + 1)), i64::MAX);
    }
}
