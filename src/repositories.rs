use std::sync::Arc;

use crate::settings::{Storage, StorageBackend};

pub mod analytics;
pub mod notifications;
pub mod ratings;
pub mod rides;
pub mod store;
pub mod tokens;
pub mod users;

pub async fn connect(storage: &Storage) -> Result<Arc<dyn store::Store>, anyhow::Error> {
    match storage.backend {
        StorageBackend::Postgres => {
            let postgres = storage.postgres.as_ref().ok_or_else(|| {
                anyhow::anyhow!("storage.postgres must be configured for the postgres backend")
            })?;

            let pg = store::PgStore::connect(&postgres.url, postgres.max_connections).await?;
            pg.migrate().await?;
            log::info!("Connected to Postgres, migrations applied.");

            Ok(Arc::new(pg))
        }
        StorageBackend::Memory => {
            log::warn!(
                "Using the in-memory store: writes are serialised and nothing is persisted. \
                 Not for production."
            );
            Ok(Arc::new(store::MemoryStore::new()))
        }
    }
}
