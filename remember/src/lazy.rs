use futures::FutureExt;
use futures::future::BoxFuture;
use shared::{BoxError, Error, Result, SharedError};
use std::any::Any;
use std::fmt::Debug;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

type Constructor<T> = Box<dyn Fn() -> BoxFuture<'static, std::result::Result<T, BoxError>> + Send + Sync>;

/// Memoized, concurrency-safe constructor for a backend client.
///
/// The first [`Lazy::get`] runs the constructor; every caller arriving
/// while it runs waits for the same outcome. The outcome is kept for the
/// lifetime of the `Lazy`: a client that failed to build (returned an error
/// or panicked) is never retried, and each `get` reports that failure again.
pub struct Lazy<T> {
    cell: OnceCell<std::result::Result<Arc<T>, SharedError>>,
    constructor: Constructor<T>,
}

impl<T> Lazy<T>
where
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut, E>(constructor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let constructor: Constructor<T> = Box::new(move || {
            let fut = constructor();
            async move { fut.await.map_err(Into::into) }.boxed()
        });
        Self {
            cell: OnceCell::new(),
            constructor,
        }
    }

    /// Get the client, building it on first use.
    pub async fn get(&self) -> Result<Arc<T>> {
        let outcome = self
            .cell
            .get_or_init(|| async {
                info!("Constructing {}", std::any::type_name::<T>());
                // the constructor call itself happens inside the guarded future
                let attempt = AssertUnwindSafe(async { (self.constructor)().await })
                    .catch_unwind()
                    .await;
                match attempt {
                    Ok(Ok(client)) => Ok(Arc::new(client)),
                    Ok(Err(e)) => {
                        error!("Construction of {} failed: {}", std::any::type_name::<T>(), e);
                        Err(SharedError::from(e))
                    }
                    Err(payload) => {
                        let msg = panic_message(payload);
                        error!("Construction of {} panicked: {}", std::any::type_name::<T>(), msg);
                        Err(SharedError::from(BoxError::from(msg)))
                    }
                }
            })
            .await;

        match outcome {
            Ok(client) => Ok(Arc::clone(client)),
            Err(e) => Err(Error::Construction(Arc::clone(e))),
        }
    }

    /// Whether construction has finished, successfully or not.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.cell.get() {
            None => "pending",
            Some(Ok(_)) => "ready",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("Lazy").field("state", &state).finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("constructor panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("constructor panicked: {}", s)
    } else {
        "constructor panicked".to_string()
    }
}
