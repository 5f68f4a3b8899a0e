//! Order store port
//!
//! The persistence boundary for orders. Adapters must report a duplicate
//! `order_number` as [`StoreError::Conflict`] so callers can tell it apart from
//! other storage failures.

use async_trait::async_trait;
use orderdesk_models::{NewOrder, OrderPage, OrderQuery, OrderRecord, OrderUpdate};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("order '{order_number}' already exists")]
    Conflict { order_number: String },

    #[error("order {id} not found")]
    NotFound { id: Uuid },

    #[error("invalid order record: {message}")]
    InvalidRecord { message: String },

    #[error("storage backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. Fails with `Conflict` if the order number is taken.
    async fn insert(&self, order: NewOrder) -> StoreResult<OrderRecord>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>>;

    /// Filtered, sorted page of orders plus the total matching count.
    async fn list(&self, query: &OrderQuery) -> StoreResult<OrderPage>;

    async fn update(&self, id: Uuid, update: OrderUpdate) -> StoreResult<OrderRecord>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// Cheap liveness probe for health checks.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
