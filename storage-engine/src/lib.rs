//! Backends for `remember`: an in-process moka map, a JSON adapter over any
//! remote key-value client (Redis behind the `redis` feature), and the
//! process-wide default.

pub mod defaults;
pub mod moka_cache;
#[cfg(feature = "redis")]
pub mod redis_client;
pub mod remote;
pub mod shared_backend;

pub use defaults::{
    configure, configure_from_env, default_backend, remember_default, remember_in_memory,
    set_default_backend,
};
pub use moka_cache::{MemoryBackend, MemoryOptions};
#[cfg(feature = "redis")]
pub use redis_client::RedisClient;
pub use remote::RemoteBackend;
pub use shared_backend::SharedBackend;
