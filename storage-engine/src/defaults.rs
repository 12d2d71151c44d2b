//! Process-wide default backend.
//!
//! Prefer passing a backend to [`remember::remember`] directly. The default
//! exists for call sites that cannot carry one around. Configure it once at
//! startup, before traffic begins: swapping it while requests are in flight
//! means some of them use the old backend and some the new one.

use crate::moka_cache::MemoryBackend;
use crate::shared_backend::SharedBackend;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::config::Settings;
use shared::{Error, Result};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

static DEFAULT_BACKEND: LazyLock<RwLock<SharedBackend>> =
    LazyLock::new(|| RwLock::new(SharedBackend::Memory(MemoryBackend::shared())));

/// Replace the process-wide default backend.
pub fn set_default_backend(backend: SharedBackend) {
    info!("Default cache backend set to {:?}", backend);
    *DEFAULT_BACKEND.write() = backend;
}

/// Handle to the current default backend. Starts out as the process-wide
/// in-process map.
pub fn default_backend() -> SharedBackend {
    DEFAULT_BACKEND.read().clone()
}

/// Build the default backend from `REMEMBER_*` environment variables and
/// install it.
pub fn configure_from_env() -> Result<SharedBackend> {
    configure(&Settings::from_env())
}

pub fn configure(settings: &Settings) -> Result<SharedBackend> {
    let backend = SharedBackend::from_settings(settings)?;
    set_default_backend(backend.clone());
    Ok(backend)
}

/// [`remember::remember`] against the default backend.
pub async fn remember_default<V, F, Fut, E>(key: &str, fetch: F) -> std::result::Result<V, E>
where
    V: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(V, Duration), E>>,
    E: From<Error>,
{
    let backend = default_backend();
    remember::remember(&backend, key, fetch).await
}

/// [`remember::remember`] against the process-wide in-process map, whatever
/// the default backend is.
pub async fn remember_in_memory<V, F, Fut, E>(key: &str, fetch: F) -> std::result::Result<V, E>
where
    V: Clone + Send + Sync + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(V, Duration), E>>,
    E: From<Error>,
{
    let backend = MemoryBackend::shared();
    remember::remember(&backend, key, fetch).await
}
