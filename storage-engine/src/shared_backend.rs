use crate::moka_cache::{MemoryBackend, MemoryOptions};
use crate::remote::RemoteBackend;
use async_trait::async_trait;
use remember::{Backend, RemoteClient};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::{BackendKind, Settings};
use shared::{BoxError, Result};
use std::future::Future;
use std::time::Duration;

/// Backend handle that works for any serde value type
///
/// This is what the process-wide default holds, and what
/// [`SharedBackend::from_settings`] builds.
#[derive(Clone, Debug)]
pub enum SharedBackend {
    Memory(MemoryBackend),
    Remote(RemoteBackend<Box<dyn RemoteClient>>),
}

impl SharedBackend {
    pub fn memory(options: MemoryOptions) -> Self {
        SharedBackend::Memory(MemoryBackend::new(options))
    }

    /// Remote backend whose client is built on first use
    pub fn remote<C, F, Fut, E>(constructor: F) -> Self
    where
        C: RemoteClient,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<C, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        SharedBackend::Remote(RemoteBackend::new(move || {
            let client = constructor();
            async move {
                client
                    .await
                    .map(|c| Box::new(c) as Box<dyn RemoteClient>)
                    .map_err(Into::<BoxError>::into)
            }
        }))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.backend {
            BackendKind::Memory => Ok(Self::memory(MemoryOptions::from(settings))),
            BackendKind::Redis => Self::redis(settings.redis_url.clone()),
        }
    }

    #[cfg(feature = "redis")]
    fn redis(url: String) -> Result<Self> {
        Ok(Self::remote(move || {
            let url = url.clone();
            async move { crate::redis_client::RedisClient::connect(&url).await }
        }))
    }

    #[cfg(not(feature = "redis"))]
    fn redis(_url: String) -> Result<Self> {
        Err(shared::Error::Config(
            "redis backend requested but the 'redis' feature is not enabled".to_string(),
        ))
    }
}

#[async_trait]
impl<V> Backend<V> for SharedBackend
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn fetch_stored(&self, key: &str) -> Result<Option<V>> {
        match self {
            SharedBackend::Memory(memory) => Backend::<V>::fetch_stored(memory, key).await,
            SharedBackend::Remote(remote) => Backend::<V>::fetch_stored(remote, key).await,
        }
    }

    async fn store(&self, key: &str, value: &V, ttl: Duration) -> Result<()> {
        match self {
            SharedBackend::Memory(memory) => memory.store(key, value, ttl).await,
            SharedBackend::Remote(remote) => remote.store(key, value, ttl).await,
        }
    }
}
