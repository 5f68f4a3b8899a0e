//! Order Repository
//!
//! PostgreSQL adapter for the order store.
//! Uses runtime SQL queries (unchecked) to avoid requiring DATABASE_URL at compile time.
//! Reads go through the `order_listing` view, which joins in the agent name.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use orderdesk_models::{NewOrder, OrderPage, OrderQuery, OrderRecord, OrderUpdate};

use crate::store::{OrderStore, StoreError, StoreResult};

const ORDER_COLUMNS: &str = r#"
    id, order_number, order_date, order_type, customer_name, customer_number,
    reseller_name, reseller_code, project_name, designer, agent_id,
    agent_name, created_at, updated_at
"#;

/// Rows written by the `written` CTE, with the agent name joined in.
const WRITTEN_ROWS: &str = r#"
    SELECT written.*, agents.name AS agent_name
    FROM written
    LEFT JOIN agents ON agents.id = written.agent_id
"#;

pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &OrderQuery) {
        builder.push(" WHERE TRUE");

        if let Some(term) = query.search_term() {
            builder
                .push(" AND order_number ILIKE ")
                .push_bind(format!("%{}%", escape_like(term)));
        }
        if let Some(start) = query.start_date {
            builder.push(" AND order_date >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            builder.push(" AND order_date <= ").push_bind(end);
        }
    }
}

/// Escape LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

fn map_write_error(error: sqlx::Error, order_number: &str) -> StoreError {
    match error {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
            order_number: order_number.to_string(),
        },
        other => map_update_error(other),
    }
}

fn map_update_error(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::Database(db_err) if db_err.is_check_violation() || db_err.is_foreign_key_violation() => {
            StoreError::InvalidRecord {
                message: db_err.message().to_string(),
            }
        }
        other => StoreError::backend(other.to_string()),
    }
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::backend(error.to_string())
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn insert(&self, order: NewOrder) -> StoreResult<OrderRecord> {
        let now = Utc::now();

        let result = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            WITH written AS (
                INSERT INTO orders
                    (id, order_number, order_date, order_type, customer_name, customer_number,
                     reseller_name, reseller_code, project_name, designer, agent_id,
                     created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                RETURNING *
            )
            {}
            "#,
            WRITTEN_ROWS
        ))
        .bind(Uuid::new_v4())
        .bind(&order.order_number)
        .bind(order.order_date)
        .bind(&order.order_type)
        .bind(&order.customer_name)
        .bind(&order.customer_number)
        .bind(&order.reseller_name)
        .bind(&order.reseller_code)
        .bind(&order.project_name)
        .bind(&order.designer)
        .bind(order.agent_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => {
                tracing::debug!(order_id = %record.id, order_number = %record.order_number, "Inserted order");
                Ok(record)
            }
            Err(e) => Err(map_write_error(e, &order.order_number)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<OrderRecord>> {
        sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {} FROM order_listing WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)
    }

    async fn list(&self, query: &OrderQuery) -> StoreResult<OrderPage> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM order_listing");
        Self::push_filters(&mut count, query);
        let total_count: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM order_listing", ORDER_COLUMNS));
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY ")
            .push(query.sort.column_name())
            .push(" ")
            .push(query.direction.as_sql())
            .push(", id")
            .push(" LIMIT ")
            .push_bind(i64::from(query.per_page))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let orders = select
            .build_query_as::<OrderRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        Ok(OrderPage::new(orders, total_count.max(0) as u64, query))
    }

    async fn update(&self, id: Uuid, update: OrderUpdate) -> StoreResult<OrderRecord> {
        let row = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            WITH written AS (
                UPDATE orders
                SET order_date = $2, order_type = $3, customer_name = $4, customer_number = $5,
                    reseller_name = $6, reseller_code = $7, project_name = $8, designer = $9,
                    agent_id = $10, updated_at = $11
                WHERE id = $1
                RETURNING *
            )
            {}
            "#,
            WRITTEN_ROWS
        ))
        .bind(id)
        .bind(update.order_date)
        .bind(&update.order_type)
        .bind(&update.customer_name)
        .bind(&update.customer_number)
        .bind(&update.reseller_name)
        .bind(&update.reseller_code)
        .bind(&update.project_name)
        .bind(&update.designer)
        .bind(update.agent_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_update_error)?;

        row.ok_or(StoreError::NotFound { id })
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::postgres::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::backend(e.to_string()))
    }
}
