// Swaps the process-wide default, so it lives in its own test binary.

use bytes::Bytes;
use remember::RemoteClient;
use shared::config::Settings;
use shared::{BoxError, Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storage_engine::{
    MemoryOptions, SharedBackend, configure, default_backend, remember_default,
    set_default_backend,
};

#[derive(Clone, Default)]
struct MapStore {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

#[async_trait::async_trait]
impl RemoteClient for MapStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn set(&self, key: &str, value: Bytes, _ttl: Option<Duration>) -> Result<()> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[tokio::test]
async fn test_default_backend_is_swappable() {
    // starts as the in-process map
    assert!(matches!(default_backend(), SharedBackend::Memory(_)));
    let value: u32 = remember_default("answer", || async { Ok::<_, Error>((42, Duration::from_secs(5))) })
        .await
        .unwrap();
    assert_eq!(value, 42);

    // swap to a remote store, built lazily on first use
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    let store = MapStore::default();
    let remote_store = store.clone();
    set_default_backend(SharedBackend::remote(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let store = remote_store.clone();
        async move { Ok::<_, BoxError>(store) }
    }));
    assert!(matches!(default_backend(), SharedBackend::Remote(_)));
    assert_eq!(builds.load(Ordering::SeqCst), 0);

    let value: u32 = remember_default("answer", || async { Ok::<_, Error>((7, Duration::from_secs(5))) })
        .await
        .unwrap();
    assert_eq!(value, 7, "new backend starts empty");
    assert_eq!(store.entries.lock().unwrap()["answer"], Bytes::from_static(b"7"));

    let value: u32 = remember_default("answer", || async { Ok::<_, Error>((8, Duration::from_secs(5))) })
        .await
        .unwrap();
    assert_eq!(value, 7);
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    // back to a fresh in-process map from settings
    let installed = configure(&Settings::default()).unwrap();
    assert!(matches!(installed, SharedBackend::Memory(_)));
    set_default_backend(SharedBackend::memory(MemoryOptions::default()));
    let value: u32 = remember_default("answer", || async { Ok::<_, Error>((9, Duration::from_secs(5))) })
        .await
        .unwrap();
    assert_eq!(value, 9);
}
