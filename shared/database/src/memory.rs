//! In-memory order store
//!
//! Used for local runs (`database.backend = "memory"`) and tests. Enforces the
//! same uniqueness rule on `order_number` and the same agent reference rule as
//! the database.

use async_trait::async_trait;
use chrono::Utc;
use orderdesk_models::{
    NewOrder, OrderPage, OrderQuery, OrderRecord, OrderSortColumn, OrderUpdate, SortDirection,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{OrderStore, StoreError, StoreResult};

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, OrderRecord>>>,
    agents: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sales agent that orders may reference.
    pub async fn add_agent(&self, id: Uuid, name: impl Into<String>) {
        self.agents.write().await.insert(id, name.into());
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn check_agent(&self, agent_id: Option<Uuid>) -> StoreResult<()> {
        match agent_id {
            Some(id) if !self.agents.read().await.contains_key(&id) => Err(StoreError::InvalidRecord {
                message: format!("agent {} does not exist", id),
            }),
            _ => Ok(()),
        }
    }
}

/// Copy of `record` with the agent name filled in, as the listing join does.
fn with_agent(record: &OrderRecord, agents: &HashMap<Uuid, String>) -> OrderRecord {
    let mut record = record.clone();
    record.agent_name = record.agent_id.and_then(|id| agents.get(&id).cloned());
    record
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> StoreResult<OrderRecord> {
        self.check_agent(order.agent_id).await?;
        let record = {
            let mut orders = self.orders.write().await;

            if orders.values().any(|existing| existing.order_number == order.order_number) {
                return Err(StoreError::Conflict {
                    order_number: order.order_number,
                });
            }

            let record = OrderRecord::from_new(order, Utc::now());
            orders.insert(record.id, record.clone());
            record
        };
        tracing::debug!(order_id = %record.id, order_number = %record.order_number, "Inserted order");
        Ok(with_agent(&record, &*self.agents.read().await))
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>> {
        let agents = self.agents.read().await;
        Ok(self.orders.read().await.get(&id).map(|o| with_agent(o, &agents)))
    }

    async fn list(&self, query: &OrderQuery) -> StoreResult<OrderPage> {
        let agents = self.agents.read().await;
        let orders = self.orders.read().await;

        let mut matching: Vec<OrderRecord> = orders
            .values()
            .filter(|o| query.matches(o))
            .map(|o| with_agent(o, &agents))
            .collect();
        matching.sort_by(|a, b| compare(a, b, query.sort, query.direction));

        let total_count = matching.len() as u64;
        let page: Vec<OrderRecord> = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.per_page as usize)
            .collect();

        Ok(OrderPage::new(page, total_count, query))
    }

    async fn update(&self, id: Uuid, update: OrderUpdate) -> StoreResult<OrderRecord> {
        self.check_agent(update.agent_id).await?;
        let record = {
            let mut orders = self.orders.write().await;
            let record = orders.get_mut(&id).ok_or(StoreError::NotFound { id })?;
            record.apply_update(update, Utc::now());
            record.clone()
        };
        Ok(with_agent(&record, &*self.agents.read().await))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        self.orders
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }
}

/// Order two rows the way PostgreSQL would for the same ORDER BY: nulls sort
/// last ascending and first descending. Ties break on id for a stable page.
fn compare(a: &OrderRecord, b: &OrderRecord, column: OrderSortColumn, direction: SortDirection) -> Ordering {
    let ordering = match column {
        OrderSortColumn::OrderNumber => a.order_number.cmp(&b.order_number),
        OrderSortColumn::OrderDate => a.order_date.cmp(&b.order_date),
        OrderSortColumn::CustomerName => nulls_last(&a.customer_name, &b.customer_name),
        OrderSortColumn::ResellerName => a.reseller_name.cmp(&b.reseller_name),
        OrderSortColumn::AgentName => nulls_last(&a.agent_name, &b.agent_name),
        OrderSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderSortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };

    let ordering = match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };

    ordering.then_with(|| a.id.cmp(&b.id))
}

fn nulls_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_order(number: &str, date: (i32, u32, u32), customer: Option<&str>) -> NewOrder {
        NewOrder {
            order_number: number.to_string(),
            order_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            order_type: Some("Standard".to_string()),
            customer_name: customer.map(str::to_string),
            customer_number: None,
            reseller_name: "Acme Resellers".to_string(),
            reseller_code: None,
            project_name: None,
            designer: None,
            agent_id: None,
        }
    }

    async fn seeded() -> InMemoryOrderStore {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("1001", (2024, 1, 12), Some("Beta"))).await.unwrap();
        store.insert(new_order("1002", (2024, 2, 3), None)).await.unwrap();
        store.insert(new_order("2001", (2024, 3, 9), Some("Alpha"))).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_duplicate_order_number_conflicts() {
        let store = InMemoryOrderStore::new();
        store.insert(new_order("1001", (2024, 1, 12), None)).await.unwrap();

        let error = store.insert(new_order("1001", (2024, 5, 1), None)).await.unwrap_err();
        assert_eq!(error, StoreError::Conflict { order_number: "1001".to_string() });
        assert!(error.is_conflict());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_default_listing_is_newest_first() {
        let store = seeded().await;
        let page = store.list(&OrderQuery::default()).await.unwrap();

        let numbers: Vec<&str> = page.orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["2001", "1002", "1001"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_search_and_date_filters() {
        let store = seeded().await;

        let query = OrderQuery { search: Some("10".to_string()), ..OrderQuery::default() };
        assert_eq!(store.list(&query).await.unwrap().total_count, 2);

        let query = OrderQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            ..OrderQuery::default()
        };
        let page = store.list(&query).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.orders.iter().all(|o| o.order_number != "1001"));
    }

    #[tokio::test]
    async fn test_sort_nulls_last_and_pagination() {
        let store = seeded().await;

        let query = OrderQuery {
            sort: OrderSortColumn::CustomerName,
            direction: SortDirection::Asc,
            per_page: 2,
            ..OrderQuery::default()
        };
        let first = store.list(&query).await.unwrap();
        let names: Vec<Option<&str>> = first.orders.iter().map(|o| o.customer_name.as_deref()).collect();
        assert_eq!(names, vec![Some("Alpha"), Some("Beta")]);
        assert_eq!(first.total_pages, 2);

        let second = store.list(&OrderQuery { page: 2, ..query }).await.unwrap();
        assert_eq!(second.orders.len(), 1);
        assert_eq!(second.orders[0].order_number, "1002");
    }

    #[tokio::test]
    async fn test_agent_name_is_joined_and_sortable() {
        let store = seeded().await;
        let (zeno, anna) = (Uuid::new_v4(), Uuid::new_v4());
        store.add_agent(zeno, "Zeno").await;
        store.add_agent(anna, "Anna").await;

        let mut order = new_order("3001", (2024, 4, 1), None);
        order.agent_id = Some(zeno);
        let record = store.insert(order).await.unwrap();
        assert_eq!(record.agent_name.as_deref(), Some("Zeno"));

        let mut order = new_order("3002", (2024, 4, 2), None);
        order.agent_id = Some(anna);
        store.insert(order).await.unwrap();

        let query = OrderQuery {
            sort: OrderSortColumn::AgentName,
            direction: SortDirection::Asc,
            ..OrderQuery::default()
        };
        let page = store.list(&query).await.unwrap();
        let agents: Vec<Option<&str>> = page.orders.iter().map(|o| o.agent_name.as_deref()).collect();
        assert_eq!(agents, vec![Some("Anna"), Some("Zeno"), None, None, None]);
        assert_eq!(page.orders[0].order_number, "3002");
    }

    #[tokio::test]
    async fn test_unknown_agent_is_invalid_record() {
        let store = InMemoryOrderStore::new();
        let mut order = new_order("1001", (2024, 1, 12), None);
        order.agent_id = Some(Uuid::new_v4());

        let error = store.insert(order).await.unwrap_err();
        assert!(matches!(error, StoreError::InvalidRecord { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryOrderStore::new();
        let record = store.insert(new_order("1001", (2024, 1, 12), None)).await.unwrap();

        let updated = store
            .update(
                record.id,
                OrderUpdate {
                    order_date: record.order_date,
                    order_type: None,
                    customer_name: Some("Acme Corp".to_string()),
                    customer_number: None,
                    reseller_name: "New Reseller".to_string(),
                    reseller_code: None,
                    project_name: None,
                    designer: None,
                    agent_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.order_number, "1001");
        assert_eq!(updated.reseller_name, "New Reseller");

        store.delete(record.id).await.unwrap();
        assert!(store.find_by_id(record.id).await.unwrap().is_none());
        assert_eq!(
            store.delete(record.id).await,
            Err(StoreError::NotFound { id: record.id })
        );
    }
}
