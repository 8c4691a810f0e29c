// SPDX-License-Identifier: MIT
// storage/mod.rs — SQLite storage foundation for the storefront.
//
// Owns the connection pool and the idempotent schema migrations for every
// table: products, cart_items, customers, orders, order_items,
// order_statuses, order_status_history. Domain stores (catalog, cart,
// orders) are created from clones of this pool.

use anyhow::{Context as _, Result};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the daemon indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
pub async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("butik.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory storage for tests. A single connection is mandatory here:
    /// every new `:memory:` connection would otherwise see a fresh empty
    /// database.
    pub async fn new_in_memory() -> Result<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    /// Used to create the domain stores sharing the same SQLite connection.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS products (
                id             TEXT PRIMARY KEY,
                name           TEXT NOT NULL,
                description    TEXT NOT NULL DEFAULT '',
                price          INTEGER NOT NULL,
                original_price INTEGER,
                category       TEXT NOT NULL,
                subcategory    TEXT,
                sizes          TEXT NOT NULL DEFAULT '[]',
                colors         TEXT NOT NULL DEFAULT '[]',
                images         TEXT NOT NULL DEFAULT '[]',
                material       TEXT,
                stock          INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
                is_sale        INTEGER NOT NULL DEFAULT 0,
                occasion       TEXT NOT NULL DEFAULT '[]',
                style          TEXT NOT NULL DEFAULT '',
                tags           TEXT NOT NULL DEFAULT '[]',
                is_active      INTEGER NOT NULL DEFAULT 1,
                created_at     TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
            CREATE INDEX IF NOT EXISTS idx_products_active ON products(is_active, stock);

            CREATE TABLE IF NOT EXISTS cart_items (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                product_id TEXT NOT NULL REFERENCES products(id),
                quantity   INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
                size       TEXT,
                created_at TEXT NOT NULL,
                UNIQUE(user_id, product_id)
            );
            CREATE INDEX IF NOT EXISTS idx_cart_user ON cart_items(user_id);

            CREATE TABLE IF NOT EXISTS customers (
                id         TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL UNIQUE,
                first_name TEXT,
                last_name  TEXT,
                email      TEXT NOT NULL DEFAULT '',
                phone      TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS orders (
                id              TEXT PRIMARY KEY,
                order_number    TEXT NOT NULL UNIQUE,
                user_id         TEXT,
                customer_id     TEXT NOT NULL REFERENCES customers(id),
                status          TEXT NOT NULL DEFAULT 'pending',
                payment_status  TEXT NOT NULL DEFAULT 'pending',
                payment_method  TEXT,
                subtotal        INTEGER NOT NULL DEFAULT 0 CHECK (subtotal >= 0),
                tax             INTEGER NOT NULL DEFAULT 0 CHECK (tax >= 0),
                shipping_cost   INTEGER NOT NULL DEFAULT 0 CHECK (shipping_cost >= 0),
                discount_amount INTEGER NOT NULL DEFAULT 0 CHECK (discount_amount >= 0),
                total_amount    INTEGER NOT NULL DEFAULT 0 CHECK (total_amount >= 0),
                shipping_address TEXT,
                billing_address  TEXT,
                tracking_number  TEXT,
                estimated_delivery TEXT,
                notes           TEXT,
                notes_admin     TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
            CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

            CREATE TABLE IF NOT EXISTS order_items (
                id           TEXT PRIMARY KEY,
                order_id     TEXT NOT NULL REFERENCES orders(id),
                product_id   TEXT,
                product_name TEXT NOT NULL,
                product_sku  TEXT,
                quantity     INTEGER NOT NULL CHECK (quantity >= 1),
                unit_price   INTEGER NOT NULL CHECK (unit_price >= 0),
                total_price  INTEGER NOT NULL CHECK (total_price >= 0)
            );
            CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);

            CREATE TABLE IF NOT EXISTS order_statuses (
                name           TEXT PRIMARY KEY,
                display_name   TEXT NOT NULL,
                description    TEXT NOT NULL DEFAULT '',
                color          TEXT NOT NULL DEFAULT '',
                sequence_order INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS order_status_history (
                id              TEXT PRIMARY KEY,
                order_id        TEXT NOT NULL REFERENCES orders(id),
                status          TEXT NOT NULL,
                changed_by      TEXT,
                changed_by_type TEXT NOT NULL DEFAULT 'admin',
                notes           TEXT,
                created_at      TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_history_order ON order_status_history(order_id);
            ",
        )
        .execute(pool)
        .await
        .context("Creating storefront tables")?;

        Self::seed_statuses(pool).await?;
        Ok(())
    }

    /// Seed the order_statuses reference table. Display ordering lives in
    /// `sequence_order` and is read back sorted, never hardcoded in views.
    async fn seed_statuses(pool: &SqlitePool) -> Result<()> {
        let rows: [(&str, &str, &str, &str, i64); 7] = [
            ("pending", "Menunggu", "Pesanan diterima, menunggu konfirmasi", "gray", 1),
            ("confirmed", "Dikonfirmasi", "Pesanan dikonfirmasi admin", "blue", 2),
            ("processing", "Diproses", "Pesanan sedang disiapkan", "yellow", 3),
            ("shipped", "Dikirim", "Pesanan dalam pengiriman", "orange", 4),
            ("delivered", "Diterima", "Pesanan sampai ke pelanggan", "green", 5),
            ("cancelled", "Dibatalkan", "Pesanan dibatalkan", "red", 6),
            ("refunded", "Dikembalikan", "Dana dikembalikan ke pelanggan", "red", 7),
        ];
        for (name, display_name, description, color, seq) in rows {
            sqlx::query(
                "INSERT OR IGNORE INTO order_statuses (name, display_name, description, color, sequence_order)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(name)
            .bind(display_name)
            .bind(description)
            .bind(color)
            .bind(seq)
            .execute(pool)
            .await
            .context("Seeding order_statuses")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let storage = Storage::new_in_memory().await.unwrap();
        // Running migrations again against the same pool must not fail.
        Storage::migrate(&storage.pool()).await.unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_statuses")
            .fetch_one(&storage.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 7);
    }

    #[tokio::test]
    async fn test_statuses_sorted_by_sequence() {
        let storage = Storage::new_in_memory().await.unwrap();
        let names: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM order_statuses ORDER BY sequence_order ASC")
                .fetch_all(&storage.pool())
                .await
                .unwrap();
        let names: Vec<&str> = names.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "pending",
                "confirmed",
                "processing",
                "shipped",
                "delivered",
                "cancelled",
                "refunded"
            ]
        );
    }
}
