use anyhow::Result;
use sqlx::PgPool;

pub async fn run_postgres_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running PostgreSQL migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS agents (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // order_number is the business key; imports rely on the unique constraint
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            order_number VARCHAR(255) NOT NULL,
            order_date DATE NOT NULL,
            order_type VARCHAR(255),
            customer_name VARCHAR(255),
            customer_number VARCHAR(255),
            reseller_name VARCHAR(255) NOT NULL,
            reseller_code VARCHAR(255),
            project_name VARCHAR(255),
            designer VARCHAR(255),
            agent_id UUID REFERENCES agents(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT orders_order_number_key UNIQUE (order_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_order_date ON orders(order_date)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_reseller_name ON orders(reseller_name)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE OR REPLACE VIEW order_listing AS
        SELECT o.*, a.name AS agent_name
        FROM orders o
        LEFT JOIN agents a ON a.id = o.agent_id
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("PostgreSQL migrations completed");
    Ok(())
}
