//! # Schema Bootstrap
//!
//! Creates the Tally tables on first connect. Every statement is
//! `IF NOT EXISTS`, so running it against an existing database is a no-op.
//!
//! ## Tables
//! ```text
//! categories ◄──── products ────► ingredients
//!                     ▲  │             ▲
//!                     │  └── recipe_items
//!                     │
//! customers ◄──── transactions
//! ```
//!
//! Money columns are integer cents. Timestamps are RFC 3339 text.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id   TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ingredients (
        id               TEXT PRIMARY KEY NOT NULL,
        name             TEXT NOT NULL UNIQUE,
        current_quantity REAL NOT NULL DEFAULT 0 CHECK (current_quantity >= 0),
        package_size     REAL NOT NULL DEFAULT 1 CHECK (package_size > 0),
        par_level        REAL CHECK (par_level IS NULL OR par_level >= 0),
        unit             TEXT NOT NULL DEFAULT 'each',
        unit_cost_cents  INTEGER CHECK (unit_cost_cents IS NULL OR unit_cost_cents >= 0),
        is_active        INTEGER NOT NULL DEFAULT 1,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id                   TEXT PRIMARY KEY NOT NULL,
        name                 TEXT NOT NULL,
        category_id          TEXT REFERENCES categories(id) ON DELETE SET NULL,
        price_cents          INTEGER NOT NULL CHECK (price_cents >= 0),
        linked_ingredient_id TEXT REFERENCES ingredients(id) ON DELETE SET NULL,
        is_active            INTEGER NOT NULL DEFAULT 1,
        created_at           TEXT NOT NULL,
        updated_at           TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    r#"
    CREATE TABLE IF NOT EXISTS recipe_items (
        id                TEXT PRIMARY KEY NOT NULL,
        product_id        TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
        ingredient_id     TEXT NOT NULL REFERENCES ingredients(id),
        quantity_required REAL NOT NULL CHECK (quantity_required > 0)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_recipe_items_product ON recipe_items(product_id)",
    r#"
    CREATE TABLE IF NOT EXISTS customers (
        id                 TEXT PRIMARY KEY NOT NULL,
        name               TEXT NOT NULL,
        email              TEXT UNIQUE,
        balance_cents      INTEGER NOT NULL DEFAULT 0,
        credit_limit_cents INTEGER NOT NULL DEFAULT 0 CHECK (credit_limit_cents >= 0),
        tab_status         TEXT NOT NULL DEFAULT 'active'
                           CHECK (tab_status IN ('active', 'suspended', 'frozen')),
        created_at         TEXT NOT NULL,
        updated_at         TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id             TEXT PRIMARY KEY NOT NULL,
        receipt_number TEXT NOT NULL UNIQUE,
        customer_id    TEXT REFERENCES customers(id),
        employee_id    TEXT NOT NULL,
        total_cents    INTEGER NOT NULL,
        created_at     TEXT NOT NULL,
        is_voided      INTEGER NOT NULL DEFAULT 0,
        voided_at      TEXT,
        voided_by      TEXT,
        void_reason    TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_created ON transactions(created_at)",
];

/// Creates any missing tables and indexes.
pub async fn ensure_schema(pool: &SqlitePool) -> DbResult<()> {
    info!("Ensuring database schema");

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DbError::SchemaFailed(e.to_string()))?;
    }

    debug!(statements = STATEMENTS.len(), "Schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        super::ensure_schema(db.pool()).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "categories",
                "customers",
                "ingredients",
                "products",
                "recipe_items",
                "transactions"
            ]
        );
    }
}
