#![deny(clippy::all)]

use async_trait::async_trait;
use bytes::Bytes;
use shared::Result;
use std::time::Duration;

// Ports are the pluggable extension points for underlying cache implementations

/// Port for typed cache storage
///
/// The value type is a trait parameter, so whatever a call site stores is
/// what the same call site reads back.
#[async_trait]
pub trait Backend<V>: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// A missing or expired key is `Ok(None)`. Data that exists but cannot be
    /// turned back into a `V` is an error, never a miss.
    async fn fetch_stored(&self, key: &str) -> Result<Option<V>>;

    /// Store `value` under `key` for `ttl`. What a zero `ttl` means is up to
    /// the implementation.
    async fn store(&self, key: &str, value: &V, ttl: Duration) -> Result<()>;
}

/// Port for a remote key-value store speaking GET/SET semantics
#[async_trait]
pub trait RemoteClient: Send + Sync + 'static {
    /// Returns `Err(Error::NotFound)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// `ttl` of `None` stores without expiry.
    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()>;
}

#[async_trait]
impl RemoteClient for Box<dyn RemoteClient> {
    async fn get(&self, key: &str) -> Result<Bytes> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Option<Duration>) -> Result<()> {
        (**self).set(key, value, ttl).await
    }
}
