// shared/src/lib.rs

use std::sync::Arc;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared, clonable error source. Used where one failure must be reported
/// to many callers.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Raised by remote clients for an absent key. Backends turn it into a miss.
    #[error("not found")]
    NotFound,
    #[error("backend read failed: {0}")]
    BackendRead(#[source] BoxError),
    #[error("backend write failed: {0}")]
    BackendWrite(#[source] BoxError),
    #[error("fetch function failed: {0}")]
    Fetch(#[source] BoxError),
    #[error("backend construction failed: {0}")]
    Construction(SharedError),
    #[error("stored value could not be decoded: {0}")]
    Deserialization(#[source] BoxError),
    #[error("value could not be encoded: {0}")]
    Serialization(#[source] BoxError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn backend_read(err: impl Into<BoxError>) -> Self {
        Error::BackendRead(err.into())
    }

    pub fn backend_write(err: impl Into<BoxError>) -> Self {
        Error::BackendWrite(err.into())
    }

    /// Wraps a failure from a caller-supplied fetch function.
    pub fn fetch(err: impl Into<BoxError>) -> Self {
        Error::Fetch(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_not_found_is_not_found() {
        assert!(Error::NotFound.is_not_found());
        assert!(!Error::backend_read("timeout").is_not_found());
        assert!(!Error::Config("bad url".to_string()).is_not_found());
    }
}
