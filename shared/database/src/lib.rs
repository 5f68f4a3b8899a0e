pub mod memory;
pub mod migrations;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use memory::InMemoryOrderStore;
pub use postgres::{PostgresPool, create_postgres_pool};
pub use repositories::*;
pub use store::{OrderStore, StoreError, StoreResult};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum DatabaseConfig {
    Postgres {
        url: String,
        max_connections: u32,
        connection_timeout: Duration,
    },
    Memory,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::Memory
    }
}

/// Open the configured order store, running migrations for PostgreSQL.
pub async fn initialize_order_store(config: &DatabaseConfig) -> Result<Arc<dyn OrderStore>> {
    match config {
        DatabaseConfig::Postgres {
            url,
            max_connections,
            connection_timeout,
        } => {
            let pool = create_postgres_pool(url, *max_connections, *connection_timeout).await?;
            migrations::run_postgres_migrations(&pool).await?;
            Ok(Arc::new(OrderRepository::new(pool)))
        }
        DatabaseConfig::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on restart");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
    }
}
