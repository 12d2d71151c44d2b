//! Cache-aside helpers: look a key up in a backend, and on a miss compute the
//! value, store it with a TTL and hand it back.
//!
//! Backends plug in through [`ports::Backend`]. Remote stores implement the
//! byte-level [`ports::RemoteClient`] and are built lazily through
//! [`lazy::Lazy`].
//!
//! Concurrent misses on the same key are not coalesced: each caller that
//! misses runs its own fetch function and the last store wins.

pub mod key;
pub mod lazy;
pub mod orchestrator;
pub mod ports;

pub use key::normalize;
pub use lazy::Lazy;
pub use orchestrator::{remember, remember_into, remember_with_ttl};
pub use ports::{Backend, RemoteClient};
pub use shared::{BoxError, Error, Result};
