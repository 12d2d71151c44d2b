// Looks a user up twice through the configured default backend.
//
//   REMEMBER_BACKEND=memory cargo run -p storage-engine --example user_lookup
//   REMEMBER_BACKEND=redis REMEMBER_REDIS_URL=redis://127.0.0.1:6379 \
//       cargo run -p storage-engine --features redis --example user_lookup

use serde::{Deserialize, Serialize};
use shared::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

static DB_QUERIES: AtomicUsize = AtomicUsize::new(0);

async fn load_user(id: u64) -> Result<(User, Duration), Error> {
    DB_QUERIES.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let user = User {
        id,
        name: format!("user-{}", id),
    };
    Ok((user, Duration::from_secs(20)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    storage_engine::configure_from_env()?;

    for _ in 0..2 {
        let user: User = storage_engine::remember_default("user:42", || load_user(42)).await?;
        info!(?user, db_queries = DB_QUERIES.load(Ordering::SeqCst), "Looked up user");
    }

    Ok(())
}
