use async_trait::async_trait;
use bytes::Bytes;
use remember::{Backend, Lazy, RemoteClient};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{BoxError, Error, Result};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Backend over a remote key-value store.
///
/// Values travel as JSON. The client is built on first use through a
/// [`Lazy`], once per `RemoteBackend` (clones share it). A zero TTL stores the
/// entry without expiry.
pub struct RemoteBackend<C> {
    client: Arc<Lazy<C>>,
}

impl<C: RemoteClient> RemoteBackend<C> {
    pub fn new<F, Fut, E>(constructor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<C, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self {
            client: Arc::new(Lazy::new(constructor)),
        }
    }
}

impl<C> Clone for RemoteBackend<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

#[async_trait]
impl<C, V> Backend<V> for RemoteBackend<C>
where
    C: RemoteClient,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_stored(&self, key: &str) -> Result<Option<V>> {
        let client = self.client.get().await?;
        let raw = match client.get(key).await {
            Ok(raw) => raw,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| Error::Deserialization(Box::new(e)))
    }

    async fn store(&self, key: &str, value: &V, ttl: Duration) -> Result<()> {
        let encoded = serde_json::to_vec(value).map_err(|e| Error::Serialization(Box::new(e)))?;
        let ttl = (!ttl.is_zero()).then_some(ttl);

        debug!(key, bytes = encoded.len(), ?ttl, "Writing to remote store");
        let client = self.client.get().await?;
        client.set(key, Bytes::from(encoded), ttl).await
    }
}

impl<C> Debug for RemoteBackend<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("client", &self.client)
            .finish()
    }
}
