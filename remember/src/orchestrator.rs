use crate::key::normalize;
use crate::ports::Backend;
use shared::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Get-or-fetch against `backend`.
///
/// Returns the cached value for `key` when there is one. Otherwise runs
/// `fetch` once, stores the value it produced for the TTL it returned, and
/// returns it. Errors from the backend abort before `fetch` runs; an error
/// from `fetch` is returned as is and nothing is stored. If the store fails,
/// that error is returned and the computed value is dropped (use
/// [`remember_into`] to keep it).
///
/// Two callers missing on the same key at the same time will both run their
/// fetch functions.
pub async fn remember<V, B, F, Fut, E>(backend: &B, key: &str, fetch: F) -> Result<V, E>
where
    B: Backend<V> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(V, Duration), E>>,
    E: From<Error>,
{
    let key = normalize(key);

    if let Some(cached) = backend.fetch_stored(&key).await? {
        debug!(key = %key, "cache hit");
        return Ok(cached);
    }

    debug!(key = %key, "cache miss, fetching");
    let (value, ttl) = fetch().await?;
    backend.store(&key, &value, ttl).await?;
    debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "stored fetched value");

    Ok(value)
}

/// [`remember`] with the TTL fixed by the caller instead of returned by `fetch`.
pub async fn remember_with_ttl<V, B, F, Fut, E>(
    backend: &B,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<V, E>
where
    B: Backend<V> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
    E: From<Error>,
{
    remember(backend, key, || async move { fetch().await.map(|value| (value, ttl)) }).await
}

/// Get-or-fetch writing through `dst`.
///
/// On a hit `dst` receives the cached value. On a miss `dst` receives the
/// fetched value *before* it is stored, so a failed store still leaves the
/// caller with a usable, uncached value in `dst` alongside the error.
pub async fn remember_into<V, B, F, Fut, E>(
    backend: &B,
    key: &str,
    dst: &mut V,
    fetch: F,
) -> Result<(), E>
where
    B: Backend<V> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(V, Duration), E>>,
    E: From<Error>,
{
    let key = normalize(key);

    if let Some(cached) = backend.fetch_stored(&key).await? {
        debug!(key = %key, "cache hit");
        *dst = cached;
        return Ok(());
    }

    debug!(key = %key, "cache miss, fetching");
    let (value, ttl) = fetch().await?;
    *dst = value;
    backend.store(&key, dst, ttl).await?;

    Ok(())
}
