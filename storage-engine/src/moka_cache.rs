use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use parking_lot::Mutex;
use remember::Backend;
use shared::{Error, Result};
use std::any::{Any, type_name};
use std::fmt::Debug;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tracing::debug;

static PROCESS_MEMORY: LazyLock<MemoryBackend> =
    LazyLock::new(|| MemoryBackend::new(MemoryOptions::default()));

#[derive(Clone, Debug)]
pub struct MemoryOptions {
    pub name: Option<String>,
    /// Lifetime of entries stored with a zero TTL
    pub default_ttl: Duration,
    /// Minimum time between purges of expired entries
    pub sweep_interval: Duration,
    pub max_entries: Option<u64>,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            name: None,
            default_ttl: Duration::from_secs(10 * 60),
            sweep_interval: Duration::from_secs(1),
            max_entries: None,
        }
    }
}

impl From<&shared::config::Settings> for MemoryOptions {
    fn from(settings: &shared::config::Settings) -> Self {
        Self {
            name: None,
            default_ttl: settings.memory_default_ttl,
            sweep_interval: settings.memory_sweep_interval,
            max_entries: settings.memory_max_entries,
        }
    }
}

#[derive(Clone)]
struct StoredValue {
    value: Arc<dyn Any + Send + Sync>,
    ttl: Duration,
}

/// Per-entry expiry: every insert, including overwrites, restarts the clock
struct EntryTtl;

impl Expiry<String, StoredValue> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-backed in-process backend
///
/// Values are kept as-is (no serialization), one map for every value type.
/// `store` keeps its own clone of the value and `fetch_stored` hands out
/// another clone, so callers never share state with the cache. Values that
/// are themselves shared handles (`Arc`, `Rc`) still alias on clone.
///
/// A zero TTL means [`MemoryOptions::default_ttl`]. Expired entries are never
/// returned; they are purged from memory by `store` calls once
/// [`MemoryOptions::sweep_interval`] has passed since the last purge.
#[derive(Clone)]
pub struct MemoryBackend {
    cache: Cache<String, StoredValue>,
    default_ttl: Duration,
    sweep_interval: Duration,
    last_sweep: Arc<Mutex<Instant>>,
}

impl MemoryBackend {
    pub fn new(options: MemoryOptions) -> Self {
        let mut builder = Cache::builder().expire_after(EntryTtl);

        if let Some(name) = &options.name {
            builder = builder.name(name);
        }

        if let Some(capacity) = options.max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
            default_ttl: options.default_ttl,
            sweep_interval: options.sweep_interval,
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// The process-wide in-process map
    pub fn shared() -> Self {
        PROCESS_MEMORY.clone()
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions and expirations now
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }

    fn sweep_due(&self) -> bool {
        let mut last = self.last_sweep.lock();
        if last.elapsed() >= self.sweep_interval {
            *last = Instant::now();
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl<V> Backend<V> for MemoryBackend
where
    V: Clone + Send + Sync + 'static,
{
    async fn fetch_stored(&self, key: &str) -> Result<Option<V>> {
        let Some(stored) = self.cache.get(key).await else {
            return Ok(None); // Either doesn't exist or TTL expired
        };

        match stored.value.downcast_ref::<V>() {
            Some(value) => Ok(Some(value.clone())),
            None => Err(Error::Deserialization(
                format!("entry '{}' does not hold a {}", key, type_name::<V>()).into(),
            )),
        }
    }

    async fn store(&self, key: &str, value: &V, ttl: Duration) -> Result<()> {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let stored = StoredValue {
            value: Arc::new(value.clone()),
            ttl,
        };
        self.cache.insert(key.to_string(), stored).await;

        if self.sweep_due() {
            debug!("Sweeping expired in-process entries");
            self.cache.run_pending_tasks().await;
        }
        Ok(())
    }
}

impl Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}
