pub mod client;
pub mod fields;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use client::{ClientFactory, DbClient, Scope};
pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::Store;

use std::sync::Arc;

use tracing::warn;

use crate::config::{DatabaseBackend, DatabaseConfig};

/// Open the store selected by `DATABASE_BACKEND`
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
